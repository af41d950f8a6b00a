//! Frame loop driver.
//!
//! Windowed runs call [`frame`] from the redraw handler and reschedule by
//! requesting another redraw. Headless runs hand a presenter to
//! [`run_forever`], which keeps going until the presenter reports an error.

use std::convert::Infallible;

use crate::scene::Scene;
use crate::state::AppState;

/// Draws a scene once per frame.
pub trait Presenter {
    type Error;

    fn present(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

impl<F, E> Presenter for F
where
    F: FnMut(&Scene) -> Result<(), E>,
{
    type Error = E;

    fn present(&mut self, scene: &Scene) -> Result<(), E> {
        self(scene)
    }
}

/// Advance `state` by one frame and present it.
pub fn frame<P: Presenter + ?Sized>(
    state: &mut AppState,
    presenter: &mut P,
) -> Result<(), P::Error> {
    state.step();
    presenter.present(state.scene())
}

/// Run frames back to back. Only returns when presenting fails.
pub fn run_forever<P: Presenter + ?Sized>(
    state: &mut AppState,
    presenter: &mut P,
) -> Result<Infallible, P::Error> {
    loop {
        frame(state, presenter)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;
    use crate::scene::ContainerSize;

    #[test]
    fn test_run_forever_stops_on_error() {
        let params = SimulationParams { box_count: 4, ..Default::default() };
        let mut state = AppState::with_seed(params, ContainerSize::new(100, 100), 1.0, 0)
            .expect("valid params");

        let mut frames = 0;
        let mut presenter = |_: &Scene| {
            frames += 1;
            if frames == 10 {
                Err("done")
            } else {
                Ok(())
            }
        };
        let result = run_forever(&mut state, &mut presenter);
        assert!(matches!(result, Err("done")));
        assert_eq!(frames, 10);
    }
}
