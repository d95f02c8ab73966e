// demos/error_handling_demo.rs
use heston_moments::analytics::ball_roma::price_uncorrelated_approx;
use heston_moments::analytics::bs_analytic::CallPut;
use heston_moments::models::heston::{average_variance_moments, fair_strike_variance};
use heston_moments::{AnalyticConfig, Heston, HestonParams, SdeError};

fn main() {
    println!("Error Handling Demo for heston-moments");
    println!("======================================\n");

    let params = HestonParams::default();

    // Test 1: Invalid mean reversion
    println!("1. Testing zero mean reversion speed...");

    let no_reversion = HestonParams { mr: 0.0, ..params };
    match Heston::new(no_reversion) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Zero expiry
    println!("\n2. Testing zero time to expiry...");

    match average_variance_moments(&params, 0.04, 0.0) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Zero monitoring frequency
    println!("\n3. Testing zero monitoring frequency...");

    match fair_strike_variance(&params, 1.0, Some(0.0)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 4: Unsupported order
    println!("\n4. Testing approximation order 3...");

    match price_uncorrelated_approx(&params, 100.0, 100.0, 1.0, CallPut::Call, 3) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::UnsupportedOrder { order }) => {
            println!("   ✓ Caught UnsupportedOrder: order = {}", order)
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    // Test 5: Correlation is an advisory, not an error
    println!("\n5. Testing non-zero correlation...");

    let correlated = HestonParams { rho: -0.7, ..params };
    match price_uncorrelated_approx(&correlated, 100.0, 100.0, 1.0, CallPut::Call, 2) {
        Ok(result) => match result.advisory {
            Some(advisory) => println!("   ✓ Price = {:.4} with advisory: {}", result.price, advisory),
            None => println!("   Unexpected: advisory missing"),
        },
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 6: Invalid configuration
    println!("\n6. Testing invalid analytic configuration...");

    let bad_config = AnalyticConfig {
        series_threshold: 3.0,
        ..Default::default()
    };
    match Heston::with_config(params, bad_config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::InvalidConfiguration { field, reason }) => {
            println!("   ✓ Caught InvalidConfiguration: {} ({})", field, reason);
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    // Test 7: Error type matching
    println!("\n7. Testing error type matching...");

    match CallPut::try_from(0i32) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(SdeError::InvalidParameters { parameter, value, constraint }) => {
            println!("   ✓ Caught InvalidParameters: {} = {} ({})", parameter, value, constraint);
        }
        Err(other) => println!("   Unexpected error type: {}", other),
    }

    println!("\n✓ Error handling demo complete!");
    println!("All error cases were properly caught and handled.");
}
