//! Progress reporting for long-running evaluation loops

use crate::error::Result;

/// Observer port for cross-validation and grid-search progress.
///
/// `on_progress` is invoked synchronously after each completed step with
/// `(current_step, total_steps)`. Returning an error aborts the surrounding
/// loop; the caller receives that error and no partial result.
pub trait ProgressObserver {
    fn on_progress(&mut self, current: usize, total: usize) -> Result<()>;
}

/// Observer that ignores all progress events.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _current: usize, _total: usize) -> Result<()> {
        Ok(())
    }
}

/// Any plain closure is an observer that never aborts.
impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, current: usize, total: usize) -> Result<()> {
        self(current, total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HydroForecastError;

    #[test]
    fn closures_observe_without_aborting() {
        let mut seen = Vec::new();
        {
            let mut observer = |current: usize, total: usize| seen.push((current, total));
            observer.on_progress(1, 3).unwrap();
            observer.on_progress(2, 3).unwrap();
        }
        assert_eq!(seen, vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn custom_observer_can_abort() {
        struct AbortAfter(usize);
        impl ProgressObserver for AbortAfter {
            fn on_progress(&mut self, current: usize, _total: usize) -> Result<()> {
                if current >= self.0 {
                    Err(HydroForecastError::Aborted("observer limit".into()))
                } else {
                    Ok(())
                }
            }
        }
        let mut observer = AbortAfter(2);
        assert!(observer.on_progress(1, 5).is_ok());
        assert!(matches!(
            observer.on_progress(2, 5),
            Err(HydroForecastError::Aborted(_))
        ));
    }
}
