pub mod ball_roma;
pub mod bs_analytic;
