pub mod finite_difference;
pub mod jacobian;
pub mod line_estimate;
pub mod line_state;
