//! Spline-fitted display geometry and shape metrics for streamlines.
//!
//! - [`UniformBSpline`] - Cubic B-spline through a streamline's vertices
//! - [`parallel_transport_frames`] - Twist-free frames for tube extrusion
//! - [`CurveMetrics`] - Arc length and local/average/min/max curvature
//! - [`ColorMode`] - Direction-encoded segment colors
//! - [`GeometryBuilder`] - Batch curve building under a display budget
//!
//! Metrics are always computed on the raw vertices; the spline only shapes
//! what is drawn.
//!
//! # Example
//!
//! ```
//! use tract_curve::{GeometryBuilder, GeometryConfig};
//! use tract_types::{Point3, Streamline};
//!
//! let streamline = Streamline::new(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//! ])
//! .unwrap();
//!
//! let curve = GeometryBuilder::new(GeometryConfig::default()).build_curve(&streamline);
//! assert_eq!(curve.points.len(), 7);
//! assert!((curve.metrics.length - 2.0).abs() < 1e-12);
//! assert!(curve.metrics.max_curvature.abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod builder;
mod color;
mod config;
mod error;
mod frame;
mod metrics;
mod spline;

pub use builder::{CurveBatch, GeometryBuilder, SplineCurve, StreamlineCountChange, build_curve};
pub use color::{ColorMode, global_color, local_color};
pub use config::{DEFAULT_MAX_STREAMLINE_COUNT, GeometryConfig};
pub use error::{CurveError, CurveResult};
pub use frame::{Frame, parallel_transport_frames};
pub use metrics::CurveMetrics;
pub use spline::UniformBSpline;
