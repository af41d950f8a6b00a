//! Error types for TumbleBox.
//!
//! The simulation itself never fails once it is running. These types cover
//! the startup path: parameter validation, window and event loop creation,
//! GPU initialization, and (in the browser) locating the host elements.

use std::fmt;

/// Reasons the renderer could not be brought up.
#[derive(Debug)]
pub enum GpuError {
    /// The window or canvas could not back a surface.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter can present to the surface.
    Adapter(wgpu::RequestAdapterError),
    /// The adapter refused to open a device.
    Device(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "Cannot draw into the window: {}", e),
            GpuError::Adapter(e) => write!(f, "No GPU adapter can present the scene: {}", e),
            GpuError::Device(e) => write!(f, "GPU device request was refused: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Adapter(e) => Some(e),
            GpuError::Device(e) => Some(e),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::Surface(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::Device(e)
    }
}

/// Rejected simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    /// A size or count that must be strictly positive was not.
    NotPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A magnitude that must not be negative was.
    Negative {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A parameter was NaN or infinite.
    NotFinite {
        /// Parameter name.
        name: &'static str,
    },
    /// The cube colliders cannot fit between opposite container walls.
    BoxTooLarge {
        /// Cube edge length.
        box_size: f32,
        /// Container edge length.
        container_size: f32,
    },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::NotPositive { name, value } => {
                write!(f, "Parameter `{}` must be positive, got {}", name, value)
            }
            ParamsError::Negative { name, value } => {
                write!(f, "Parameter `{}` must not be negative, got {}", name, value)
            }
            ParamsError::NotFinite { name } => write!(f, "Parameter `{}` must be finite", name),
            ParamsError::BoxTooLarge { box_size, container_size } => write!(
                f,
                "Boxes of size {} do not fit in a container of size {}",
                box_size, container_size
            ),
        }
    }
}

impl std::error::Error for ParamsError {}

/// Errors that can occur when running a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Simulation parameters failed validation.
    Params(ParamsError),
    /// A required host page element is missing or has the wrong type.
    Dom(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SimulationError::Window(e) => write!(f, "Failed to create window: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Params(e) => write!(f, "Invalid parameters: {}", e),
            SimulationError::Dom(msg) => write!(f, "Host page error: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::EventLoop(e) => Some(e),
            SimulationError::Window(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            SimulationError::Params(e) => Some(e),
            SimulationError::Dom(_) => None,
        }
    }
}

impl From<winit::error::EventLoopError> for SimulationError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SimulationError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SimulationError {
    fn from(e: winit::error::OsError) -> Self {
        SimulationError::Window(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}

impl From<ParamsError> for SimulationError {
    fn from(e: ParamsError) -> Self {
        SimulationError::Params(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_params_error_message() {
        let err = ParamsError::NotPositive { name: "box_size", value: -1.0 };
        assert_eq!(err.to_string(), "Parameter `box_size` must be positive, got -1");
    }

    #[test]
    fn test_negative_message() {
        let err = ParamsError::Negative { name: "gravity", value: -10.0 };
        assert_eq!(err.to_string(), "Parameter `gravity` must not be negative, got -10");
    }

    #[test]
    fn test_adapter_error_keeps_source() {
        let err: SimulationError = GpuError::from(wgpu::RequestAdapterError::EnvNotSet).into();
        assert!(err.to_string().starts_with("GPU error: No GPU adapter can present the scene"));
        let gpu = err.source().expect("wraps the gpu error");
        assert!(gpu.source().is_some());
    }

    #[test]
    fn test_simulation_error_wraps_params() {
        let err: SimulationError = ParamsError::NotFinite { name: "gravity" }.into();
        assert!(err.to_string().contains("gravity"));
        assert!(err.source().is_some());
    }
}
