// demos/demo.rs
use heston_moments::analytics::ball_roma::{ApproxOrder, BallRoma1994};
use heston_moments::analytics::bs_analytic::CallPut;
use heston_moments::{Heston, HestonParams};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let params = HestonParams {
        mr: 1.5,
        theta: 0.04,
        vov: 0.5,
        rho: -0.6,
        intr: 0.02,
        divr: 0.01,
        sigma: 0.09,
    };
    let heston = Heston::new(params).expect("Valid parameters");

    println!("Heston analytic moments");
    println!("=======================");
    println!("{:?}\n", params);

    println!("{:>8} {:>12} {:>14} {:>12} {:>14}", "T", "E[V_T]", "Var[V_T]", "E[avg V]", "Var[avg V]");
    for &texp in &[0.01, 0.1, 0.5, 1.0, 2.0, 5.0] {
        let step = heston.variance_moments(params.sigma, texp).expect("Valid step");
        let avg = heston
            .average_variance_moments(params.sigma, texp)
            .expect("Valid expiry");
        println!(
            "{:>8.2} {:>12.6} {:>14.4e} {:>12.6} {:>14.4e}",
            texp, step.mean, step.variance, avg.mean, avg.variance
        );
    }
    let stationary = heston.stationary_moments();
    println!(
        "{:>8} {:>12.6} {:>14.4e}",
        "inf", stationary.mean, stationary.variance
    );

    println!("\nVariance swap fair strikes (T = 1)");
    for (label, freq) in [
        ("continuous", None),
        ("daily", Some(252.0)),
        ("weekly", Some(52.0)),
        ("monthly", Some(12.0)),
    ] {
        let strike = heston.fair_strike_variance(1.0, freq).expect("Valid input");
        println!("  {:<10} K_var = {:.6}  (vol {:.4})", label, strike, strike.sqrt());
    }

    println!("\nBall & Roma (1994) call prices, S = 100, T = 1 (rho is ignored)");
    let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
    let (zeroth, advisory) = BallRoma1994::new(heston, ApproxOrder::Zeroth)
        .price_strikes(&strikes, 100.0, 1.0, CallPut::Call)
        .expect("Valid input");
    let (second, _) = BallRoma1994::new(heston, ApproxOrder::Second)
        .price_strikes(&strikes, 100.0, 1.0, CallPut::Call)
        .expect("Valid input");

    println!("{:>8} {:>12} {:>12}", "K", "order 0", "order 2");
    for ((k, p0), p2) in strikes.iter().zip(&zeroth).zip(&second) {
        println!("{:>8.1} {:>12.6} {:>12.6}", k, p0, p2);
    }
    if let Some(advisory) = advisory {
        println!("\nNote: {}", advisory);
    }
}
