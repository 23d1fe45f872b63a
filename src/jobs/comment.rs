//! # Comentarios de Progreso
//! src/jobs/comment.rs
//!
//! Función pura `(progreso, tiempo transcurrido) -> mensaje`.
//!
//! | progreso        | mensaje                                   |
//! |-----------------|-------------------------------------------|
//! | `0`             | arrancando                                |
//! | `(0, 0.4)`      | porcentaje y tiempo transcurrido          |
//! | `[0.4, 0.6)`    | además el ETA                             |
//! | `[0.6, 1)`      | texto fijo                                |
//! | `1`             | completado, con el tiempo total           |

use std::time::Duration;

/// Umbral de la banda "más de la mitad"
pub const HALFWAY: f64 = 0.4;

/// Umbral de la banda de texto fijo
pub const FINAL_STRETCH: f64 = 0.6;

/// Texto fijo para la recta final
pub const FINAL_STRETCH_MESSAGE: &str =
    "Grinding through the last terms of the series. The digits are almost ready, hang tight.";

/// Genera el comentario para un progreso dado
pub fn progress_comment(progress: f64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let percent = progress * 100.0;

    if progress <= 0.0 {
        "Starting up...".to_string()
    } else if progress < HALFWAY {
        format!("Working... {:.1}% done, elapsed {:.1}s", percent, secs)
    } else if progress < FINAL_STRETCH {
        let eta = secs / progress * (1.0 - progress);
        format!(
            "More than halfway there! {:.1}% done, elapsed {:.1}s, ETA {:.1}s",
            percent, secs, eta
        )
    } else if progress < 1.0 {
        FINAL_STRETCH_MESSAGE.to_string()
    } else {
        format!("Completed in {:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn comment(progress: f64) -> String {
        progress_comment(progress, Duration::from_secs(2))
    }

    #[test]
    fn test_starting() {
        assert_eq!(comment(0.0), "Starting up...");
    }

    #[test]
    fn test_working_band() {
        assert_eq!(comment(EPS), "Working... 0.0% done, elapsed 2.0s");
        assert_eq!(comment(0.25), "Working... 25.0% done, elapsed 2.0s");
        assert!(comment(HALFWAY - EPS).starts_with("Working..."));
    }

    #[test]
    fn test_halfway_band() {
        // 2s / 0.4 * 0.6 = 3s
        assert_eq!(
            comment(HALFWAY),
            "More than halfway there! 40.0% done, elapsed 2.0s, ETA 3.0s"
        );
        assert!(comment(FINAL_STRETCH - EPS).starts_with("More than halfway there!"));
    }

    #[test]
    fn test_final_stretch_is_constant() {
        assert_eq!(comment(FINAL_STRETCH), FINAL_STRETCH_MESSAGE);
        assert_eq!(comment(0.8), FINAL_STRETCH_MESSAGE);
        assert_eq!(comment(1.0 - EPS), FINAL_STRETCH_MESSAGE);
        assert_eq!(
            progress_comment(0.7, Duration::from_secs(100)),
            progress_comment(0.9, Duration::ZERO)
        );
    }

    #[test]
    fn test_completed() {
        assert_eq!(comment(1.0), "Completed in 2.0s");
        assert_eq!(
            progress_comment(1.0, Duration::from_millis(1340)),
            "Completed in 1.3s"
        );
    }
}
