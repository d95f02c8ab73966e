// scripts/benchmark.rs
use heston_moments::analytics::ball_roma::{ApproxOrder, BallRoma1994};
use heston_moments::analytics::bs_analytic::CallPut;
use heston_moments::math_utils::Timer;
use heston_moments::{Heston, HestonParams, SdeResult};
use std::env;
use std::fs::File;
use std::hint::black_box;
use std::io::{self, Write};
use std::process::Command;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(target_os = "macos")]
        {
            Command::new("sysctl")
                .args(["-n", "machdep.cpu.brand_string"])
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown CPU".to_string())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            "Unknown CPU".to_string()
        }
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    calls: usize,
    time_ms: f64,
    ns_per_call: f64,
    value: f64,
}

/// Times `calls` evaluations of `f`, keeping the last value.
fn time_calls<F>(name: &str, calls: usize, mut f: F) -> SdeResult<BenchmarkResult>
where
    F: FnMut(usize) -> SdeResult<f64>,
{
    let mut timer = Timer::new();
    timer.start();
    let mut value = 0.0;
    for i in 0..calls {
        value = black_box(f(i)?);
    }
    let time_ms = timer.elapsed_ms();

    Ok(BenchmarkResult {
        name: name.to_string(),
        calls,
        time_ms,
        ns_per_call: time_ms * 1e6 / calls as f64,
        value,
    })
}

fn run_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let params = HestonParams {
        mr: 1.5,
        theta: 0.04,
        vov: 0.5,
        rho: 0.0,
        intr: 0.02,
        divr: 0.01,
        sigma: 0.09,
    };
    let heston = Heston::new(params)?;
    let calls = 1_000_000;
    let mut results = Vec::new();

    results.push(time_calls("Variance moments", calls, |i| {
        let dt = 0.5 + (i % 100) as f64 * 1e-3;
        Ok(heston.variance_moments(params.sigma, dt)?.variance)
    })?);

    results.push(time_calls("Average variance (closed form)", calls, |i| {
        let texp = 1.0 + (i % 100) as f64 * 1e-3;
        Ok(heston.average_variance_moments(params.sigma, texp)?.variance)
    })?);

    results.push(time_calls("Average variance (series)", calls, |i| {
        let texp = 0.01 + (i % 100) as f64 * 1e-5;
        Ok(heston.average_variance_moments(params.sigma, texp)?.variance)
    })?);

    results.push(time_calls("Fair strike (daily)", calls, |i| {
        let texp = 1.0 + (i % 100) as f64 * 1e-3;
        heston.fair_strike_variance(texp, Some(252.0))
    })?);

    let pricer = BallRoma1994::new(heston, ApproxOrder::Second);
    results.push(time_calls("Ball-Roma order 2 call", calls / 10, |i| {
        let strike = 80.0 + (i % 400) as f64 * 0.1;
        Ok(pricer.price(strike, 100.0, 1.0, CallPut::Call)?.price)
    })?);

    let strikes: Vec<f64> = (0..100_000).map(|i| 50.0 + i as f64 * 1e-3).collect();
    results.push(time_calls("Ball-Roma strike strip (100k, rayon)", 10, |_| {
        let (prices, _) = pricer.price_strikes(&strikes, 100.0, 1.0, CallPut::Put)?;
        Ok(prices.iter().sum::<f64>())
    })?);

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(file, "Benchmark,Calls,Time_ms,Ns_per_call,Value")?;
    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.1},{:.8}",
            result.name, result.calls, result.time_ms, result.ns_per_call, result.value
        )?;
    }

    Ok(())
}

fn main() {
    println!("heston-moments Benchmark Suite");
    println!("==============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = match run_benchmarks() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Benchmark failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("{:=<80}", "");
    println!(
        "{:<40} {:>10} {:>12} {:>14}",
        "Benchmark", "Calls", "Time (ms)", "ns / call"
    );
    println!("{:-<80}", "");
    for result in &results {
        println!(
            "{:<40} {:>10} {:>12.2} {:>14.1}",
            result.name, result.calls, result.time_ms, result.ns_per_call
        );
    }
    println!("{:=<80}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&results, &system_info, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("\nCould not write {}: {}", filename, e),
    }

    println!("\nTo reproduce: cargo run --bin benchmark --release");
}
