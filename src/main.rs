// src/main.rs - Harness binary for the GPU Equihash solver
// Tree location: ./src/main.rs

//! equigpu main entry point
//!
//! Thin harness around [`equigpu::GpuSolver`]: lists OpenCL devices, prints
//! derived parameters, and drives solve attempts over consecutive nonces.
//!
//! # Version History
//! - 0.1.0: info, params and solve commands

use clap::{Parser, Subcommand};
use equigpu::{
    equihash::{EquihashParams, HashState, ZCASH_HEADER_LEN},
    gpu, init, EquigpuError, GpuSolver, Result, SolveOutcome, SolverConfig,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Header bytes preceding the 32-byte nonce
const HEADER_PREFIX_LEN: usize = ZCASH_HEADER_LEN - 32;

#[derive(Parser)]
#[command(name = "equigpu")]
#[command(about = "GPU Equihash (200, 9) solver harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List OpenCL platforms and GPU devices
    Info,
    /// Print derived Equihash quantities
    Params {
        /// Hash output bit length
        #[arg(long, default_value = "200")]
        n: u32,
        /// Number of collision rounds
        #[arg(long, default_value = "9")]
        k: u32,
    },
    /// Run solve attempts over consecutive nonces
    Solve {
        /// Block header without nonce (hex, 108 bytes); zeros when omitted
        #[arg(long)]
        header: Option<String>,
        /// Starting nonce
        #[arg(long, default_value = "0")]
        nonce: u64,
        /// Number of attempts
        #[arg(short, long, default_value = "1")]
        attempts: u64,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Kernel source override
        #[arg(long)]
        kernel: Option<PathBuf>,
        /// Cancel attempts still running after this many seconds
        #[arg(long)]
        max_seconds: Option<u64>,
    },
}

fn main() -> Result<()> {
    init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Info => show_gpu_info(),
        Commands::Params { n, k } => show_params(n, k),
        Commands::Solve {
            header,
            nonce,
            attempts,
            config,
            kernel,
            max_seconds,
        } => solve(header.as_deref(), nonce, attempts, config, kernel, max_seconds),
    }
}

fn show_gpu_info() -> Result<()> {
    if !gpu::opencl_available() {
        println!("No OpenCL platforms found. Please install GPU drivers.");
        return Ok(());
    }

    for platform in gpu::list_gpu_platforms()? {
        println!("Platform {}: {} ({})", platform.index, platform.name, platform.version);
        if platform.devices.is_empty() {
            println!("  (no GPU devices)");
        }
        for device in &platform.devices {
            println!("  {}", device);
            println!(
                "    max alloc {:.1}GB, clock {}MHz",
                device.max_alloc_size as f64 / (1024.0 * 1024.0 * 1024.0),
                device.max_clock_freq
            );
        }
    }

    Ok(())
}

fn show_params(n: u32, k: u32) -> Result<()> {
    let params = EquihashParams::new(n, k)?;

    println!("{}", params);
    println!("Collision bits:          {}", params.collision_bit_length());
    println!("Collision bytes:         {}", params.collision_byte_length());
    println!("Initial list size:       {}", params.init_size());
    println!("Indices per hash output: {}", params.indices_per_hash_output());
    println!("Hash output length:      {} bytes", params.hash_output_len());
    println!("List entry length:       {} bytes", params.entry_len());
    println!("Hash length:             {} bytes", params.hash_len());
    println!("Full width:              {} bytes", params.full_width());
    println!("Solution indices:        {}", params.solution_indices());
    println!("Solution width:          {} bytes", params.solution_width());
    println!("Personalization:         {}", hex::encode(params.personalization()));

    Ok(())
}

fn solve(
    header_hex: Option<&str>,
    start_nonce: u64,
    attempts: u64,
    config_path: Option<PathBuf>,
    kernel: Option<PathBuf>,
    max_seconds: Option<u64>,
) -> Result<()> {
    let header = match header_hex {
        Some(text) => hex::decode(text.trim_start_matches("0x"))?,
        None => vec![0u8; HEADER_PREFIX_LEN],
    };
    if header.len() != HEADER_PREFIX_LEN {
        return Err(EquigpuError::InvalidState(format!(
            "header must be {} bytes, got {}",
            HEADER_PREFIX_LEN,
            header.len()
        )));
    }

    let mut config = match config_path {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(kernel) = kernel {
        config.kernel_path = kernel;
    }

    let params = EquihashParams::N200_K9;
    let solver = GpuSolver::with_config(config)?;
    let deadline = max_seconds.map(Duration::from_secs);

    println!("Solving {} for {} attempt(s) from nonce {}", params, attempts, start_nonce);

    let mut solved = 0u64;
    let mut cancelled = 0u64;
    let run_start = Instant::now();

    for nonce in start_nonce..start_nonce.saturating_add(attempts) {
        let mut state = HashState::new(params, &header)?;
        state.absorb(&nonce_bytes(nonce))?;

        let attempt_start = Instant::now();
        let outcome = solver.run(
            params.n(),
            params.k(),
            &state,
            |solution| {
                tracing::info!("🔍 Candidate solution of {} bytes for nonce {}", solution.len(), nonce);
                solution.len() == params.solution_width()
            },
            |stage| match deadline {
                Some(limit) if attempt_start.elapsed() >= limit => {
                    tracing::warn!("⏰ Deadline reached after {}", stage);
                    true
                }
                _ => false,
            },
        )?;

        match outcome {
            SolveOutcome::Solved => solved += 1,
            SolveOutcome::Cancelled(_) => cancelled += 1,
            SolveOutcome::NoSolution => {}
        }

        println!(
            "Nonce {}: {:?} in {}ms",
            nonce,
            outcome,
            attempt_start.elapsed().as_millis()
        );
    }

    println!(
        "Done: {} solved, {} cancelled, {} attempts in {:.2}s",
        solved,
        cancelled,
        attempts,
        run_start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// 32-byte little-endian nonce
fn nonce_bytes(nonce: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&nonce.to_le_bytes());
    bytes
}
