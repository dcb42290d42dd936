//! lwe-demo: send a message between two users, run the statistical trials,
//! or print the noise histogram.

use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use toylwe::attack::attack_batches;
use toylwe::codec::{bits_to_string, string_to_bits};
use toylwe::params::{EncryptionStrategy, ErrorDistribution, ParameterSet};
use toylwe::sampling::ErrorSampler;
use toylwe::trials::{crack_count, Trials};
use toylwe::user::User;

type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "lwe-demo")]
#[command(about = "Toy LWE encryption and a least-squares attack against it")]
#[command(version)]
struct Cli {
    /// Seed for every random choice (OS entropy when omitted)
    #[arg(long, global = true, env = "LWE_SEED")]
    seed: Option<u64>,

    /// Noise distribution: uniform, binomial or gaussian
    #[arg(long, global = true, env = "LWE_DISTRIBUTION", default_value_t = ErrorDistribution::default())]
    distribution: ErrorDistribution,

    /// Add the per-row scalar noise x' to batched encryptions
    #[arg(long, global = true)]
    scalar_noise: bool,

    /// Bit-vector encryption path: per-bit or batched
    #[arg(long, global = true, default_value_t = EncryptionStrategy::default())]
    strategy: EncryptionStrategy,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Alice sends a text message to Bob; an eavesdropper attacks it
    Send(SendArgs),
    /// Correctness, cross-key and attack statistics
    Trials(TrialArgs),
    /// Empirical histogram of the noise distribution
    Distribution(DistributionArgs),
}

#[derive(Args)]
struct Dimensions {
    /// Dimension N
    #[arg(short = 'n', long)]
    dimension: usize,

    /// Modulus Q
    #[arg(short = 'q', long)]
    modulus: u64,

    /// Pin the noise bound instead of deriving floor(sqrt(Q/4N))
    #[arg(long)]
    error_bound: Option<u64>,
}

#[derive(Args)]
struct SendArgs {
    #[arg(short = 'n', long, default_value_t = 1000)]
    dimension: usize,

    #[arg(short = 'q', long, default_value_t = 1_000_000_000)]
    modulus: u64,

    #[arg(short, long, default_value = "Hello Bob!")]
    message: String,

    /// Also run the least-squares attack on the ciphertext
    #[arg(long)]
    eavesdrop: bool,
}

#[derive(Args)]
struct TrialArgs {
    #[arg(short = 'n', long, default_value_t = 200)]
    dimension: usize,

    #[arg(short = 'q', long, default_value_t = 40_000)]
    modulus: u64,

    /// Messages per correctness round
    #[arg(long, default_value_t = 100)]
    rounds: usize,

    /// Bits per message
    #[arg(long, default_value_t = 50)]
    length: usize,

    /// Ciphertexts handed to the attacker
    #[arg(long, default_value_t = 1000)]
    ciphers: usize,
}

#[derive(Args)]
struct DistributionArgs {
    #[command(flatten)]
    dims: Dimensions,

    #[arg(long, default_value_t = 100_000)]
    samples: usize,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "toylwe=debug,lwe_demo=debug" } else { "toylwe=warn,lwe_demo=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).init();

    let mut rng = match cli.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_os_rng(),
    };

    match &cli.command {
        Commands::Send(args) => {
            let params = build_params(&cli, args.dimension, args.modulus, None)?;
            run_send(&params, args, &mut rng)
        }
        Commands::Trials(args) => {
            let params = build_params(&cli, args.dimension, args.modulus, None)?;
            run_trials(&params, args, &mut rng)
        }
        Commands::Distribution(args) => {
            let params = build_params(&cli, args.dims.dimension, args.dims.modulus, args.dims.error_bound)?;
            run_distribution(&params, args.samples, &mut rng);
            Ok(())
        }
    }
}

fn build_params(
    cli: &Cli,
    dimension: usize,
    modulus: u64,
    error_bound: Option<u64>,
) -> AppResult<Arc<ParameterSet>> {
    let mut builder = ParameterSet::builder(dimension, modulus)
        .distribution(cli.distribution)
        .include_scalar_noise(cli.scalar_noise)
        .strategy(cli.strategy);
    if let Some(bound) = error_bound {
        builder = builder.error_bound(bound);
    }
    let params = builder.build()?;
    info!(
        "N={} Q={} B={} distribution={} strategy={}",
        params.dimension, params.modulus, params.error_bound, params.distribution, params.strategy
    );
    Ok(params)
}

fn run_send(params: &Arc<ParameterSet>, args: &SendArgs, rng: &mut ChaCha20Rng) -> AppResult<()> {
    let mut alice = User::with_rng("Alice", params, ChaCha20Rng::seed_from_u64(rng.random()))?;
    let bob = User::with_rng("Bob", params, ChaCha20Rng::seed_from_u64(rng.random()))?;

    let bits = string_to_bits(&args.message)?;
    println!("{} wants to send '{}' to {}", alice.name(), args.message, bob.name());
    println!("Message size: {} bits", bits.len());

    let start = Instant::now();
    let ct = alice.encrypt(&bits, bob.public_key())?;
    println!(
        "Ciphertext: a is {}x{}, b has {} entries ({:.2?})",
        ct.a.rows,
        ct.a.cols,
        ct.b.len(),
        start.elapsed()
    );

    let decrypted = bob.decrypt_text(&ct)?;
    println!("{} decrypts: '{}'", bob.name(), decrypted);

    if args.eavesdrop {
        let start = Instant::now();
        let guesses = attack_batches(params, std::slice::from_ref(&ct))?;
        let wrong = guesses[0].iter().zip(&bits).filter(|(g, b)| g != b).count();
        let recovered = bits_to_string(&guesses[0]).unwrap_or_else(|_| String::from("<undecodable>"));
        println!(
            "Eavesdropper recovers {:?} ({} of {} bits wrong, {:.2?})",
            recovered,
            wrong,
            bits.len(),
            start.elapsed()
        );
    }
    Ok(())
}

fn run_trials(params: &Arc<ParameterSet>, args: &TrialArgs, rng: &mut ChaCha20Rng) -> AppResult<()> {
    let mut trials = Trials::new(params, rng)?;

    println!("Testing correctness of encryption and decryption...");
    let failed = trials.send_receive_failures(args.rounds, args.length)?;
    println!("Incorrectly encrypted/decrypted {failed} of {} messages. Expected 0", args.rounds);

    let wrong_key = trials.cross_key_successes(args.rounds, args.length)?;
    println!("Decrypted with the wrong key {wrong_key} of {} messages. Expected 0", args.rounds);

    let start = Instant::now();
    let cracked = crack_count(params, args.ciphers, args.length, rng)?;
    println!(
        "Least-squares attack broke {cracked} of {} messages ({:.2?})",
        args.ciphers,
        start.elapsed()
    );
    Ok(())
}

fn run_distribution(params: &ParameterSet, samples: usize, rng: &mut ChaCha20Rng) {
    let sampler = ErrorSampler::new(params);
    let counts = sampler.histogram(samples, rng);
    let peak = counts.values().copied().max().unwrap_or(1).max(1);

    println!("{} noise, B = {}, {samples} samples", params.distribution, sampler.bound());
    for (value, count) in &counts {
        let width = count * 60 / peak;
        println!("{value:>6} {count:>8} {}", "#".repeat(width));
    }
}
