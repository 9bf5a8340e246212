use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bitfec::ecc::noise;
use bitfec::ecc::{BitAddressing, LsbFirst, MsbFirst};
use bitfec::CodecConfig;
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fecconv", about = "Protect files against bit flips with BCH and Hamming codes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct CodecArgs {
    /// Codec: raw, bch, hamming or hamming:<m>.
    #[arg(long, conflicts_with = "pb")]
    codec: Option<CodecConfig>,
    /// Hamming parity bits per block (0 copies the file unchanged).
    #[arg(long)]
    pb: Option<u32>,
}

impl CodecArgs {
    fn resolve(&self) -> CodecConfig {
        match (self.codec, self.pb) {
            (Some(codec), _) => codec,
            (None, Some(m)) => CodecConfig::from_parity_bits(m),
            (None, None) => CodecConfig::default(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a file.
    Encode {
        #[command(flatten)]
        codec: CodecArgs,
        /// File to encode.
        #[arg(long, default_value = "image.img")]
        target: PathBuf,
        /// Where to write the encoded file.
        #[arg(long, default_value = "image.hamm")]
        out: PathBuf,
    },
    /// Decode a file, correcting what the codec can.
    Decode {
        #[command(flatten)]
        codec: CodecArgs,
        /// File to decode.
        #[arg(long, default_value = "image.hamm")]
        target: PathBuf,
        /// Where to write the decoded file.
        #[arg(long, default_value = "image.img")]
        out: PathBuf,
    },
    /// Inject bit flips into a file.
    Corrupt {
        #[command(flatten)]
        codec: CodecArgs,
        /// File to corrupt.
        #[arg(long, default_value = "image.hamm")]
        target: PathBuf,
        /// Where to write the corrupted file (default: overwrite the target).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Number of distinct bits to flip uniformly at random.
        #[arg(long)]
        flips: Option<usize>,
        /// Flip every bit independently with this probability.
        #[arg(long)]
        probability: Option<f64>,
        /// First bit of a contiguous scratch.
        #[arg(long)]
        scratch_start: Option<usize>,
        /// Length of the scratch in bits.
        #[arg(long, default_value_t = 1024)]
        scratch_len: usize,
        /// Seed for reproducible corruption.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate a test file.
    Generate {
        /// File size in bytes.
        #[arg(long, default_value_t = 512)]
        size: usize,
        /// Where to write the file.
        #[arg(long, default_value = "image.img")]
        out: PathBuf,
        /// Fill with random bytes instead of zeros.
        #[arg(long)]
        random: bool,
        /// Seed for the random contents.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encode a string, print it in hex and decode it back.
    Inspect {
        /// Text to encode.
        text: String,
        #[command(flatten)]
        codec: CodecArgs,
    },
}

/// Corruption to apply, in order
struct Corruption {
    flips: Option<usize>,
    probability: Option<f64>,
    scratch: Option<(usize, usize)>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { codec, target, out } => run_encode(codec.resolve(), &target, &out)?,
        Commands::Decode { codec, target, out } => run_decode(codec.resolve(), &target, &out)?,
        Commands::Corrupt {
            codec,
            target,
            out,
            flips,
            probability,
            scratch_start,
            scratch_len,
            seed,
        } => {
            let corruption = Corruption {
                flips,
                probability,
                scratch: scratch_start.map(|start| (start, scratch_len)),
            };
            let out = out.unwrap_or_else(|| target.clone());
            run_corrupt(codec.resolve(), &target, &out, &corruption, seed)?
        }
        Commands::Generate {
            size,
            out,
            random,
            seed,
        } => run_generate(size, &out, random, seed)?,
        Commands::Inspect { text, codec } => run_inspect(codec.resolve(), &text)?,
    }

    Ok(())
}

fn run_encode(config: CodecConfig, target: &Path, out: &Path) -> Result<()> {
    log::info!(
        "encode: target={}, out={}, codec={}",
        target.display(),
        out.display(),
        config
    );
    let input = read_file(target)?;
    let codec = config.build().context("failed to build codec")?;
    let encoded = codec
        .encode(&input)
        .with_context(|| format!("failed to encode {}", target.display()))?;
    write_file(out, &encoded)?;
    log::info!("wrote {} bytes ({} in)", encoded.len(), input.len());
    Ok(())
}

fn run_decode(config: CodecConfig, target: &Path, out: &Path) -> Result<()> {
    log::info!(
        "decode: target={}, out={}, codec={}",
        target.display(),
        out.display(),
        config
    );
    let input = read_file(target)?;
    let codec = config.build().context("failed to build codec")?;
    let decoded = codec
        .decode_with_report(&input)
        .with_context(|| format!("failed to decode {}", target.display()))?;
    write_file(out, &decoded.data)?;

    let report = decoded.report;
    log::info!(
        "wrote {} bytes: {} blocks, {} bits corrected in {} blocks",
        decoded.data.len(),
        report.blocks,
        report.corrected_bits,
        report.corrected_blocks
    );
    if report.uncorrectable_blocks > 0 {
        log::warn!("{} blocks were uncorrectable", report.uncorrectable_blocks);
    }
    Ok(())
}

fn run_corrupt(
    config: CodecConfig,
    target: &Path,
    out: &Path,
    corruption: &Corruption,
    seed: Option<u64>,
) -> Result<()> {
    if corruption.flips.is_none()
        && corruption.probability.is_none()
        && corruption.scratch.is_none()
    {
        bail!("nothing to do: pass --flips, --probability or --scratch-start");
    }

    let mut data = read_file(target)?;
    let mut rng = seeded_rng(seed);
    let flipped = if config.is_msb_first() {
        corrupt::<MsbFirst>(&mut data, corruption, &mut rng)?
    } else {
        corrupt::<LsbFirst>(&mut data, corruption, &mut rng)?
    };
    write_file(out, &data)?;
    log::info!(
        "flipped {} bits of {} ({} addressing)",
        flipped,
        target.display(),
        if config.is_msb_first() {
            MsbFirst::NAME
        } else {
            LsbFirst::NAME
        }
    );
    Ok(())
}

fn corrupt<A: BitAddressing>(
    data: &mut [u8],
    corruption: &Corruption,
    rng: &mut ChaCha20Rng,
) -> Result<usize> {
    let mut flipped = 0;
    if let Some(count) = corruption.flips {
        flipped += noise::flip_random_bits::<A, _>(data, count, rng)
            .context("random bit flips failed")?
            .len();
    }
    if let Some(probability) = corruption.probability {
        flipped += noise::flip_with_probability::<A, _>(data, probability, rng)
            .context("white noise failed")?;
    }
    if let Some((start, length)) = corruption.scratch {
        noise::scratch::<A>(data, start, length).context("scratch failed")?;
        flipped += length;
    }
    Ok(flipped)
}

fn run_generate(size: usize, out: &Path, random: bool, seed: Option<u64>) -> Result<()> {
    let mut body = vec![0u8; size];
    if random {
        seeded_rng(seed).fill(body.as_mut_slice());
    }
    write_file(out, &body)?;
    log::info!("generated {} bytes at {}", size, out.display());
    Ok(())
}

fn run_inspect(config: CodecConfig, text: &str) -> Result<()> {
    let codec = config.build().context("failed to build codec")?;
    let encoded = codec.encode(text.as_bytes())?;
    let decoded = codec.decode(&encoded)?;
    let round_trip = &decoded[..text.len().min(decoded.len())];

    println!("codec:   {}", config);
    println!("input:   {} bytes", text.len());
    println!("encoded: {} bytes", encoded.len());
    println!("{}", hex::encode(&encoded));
    println!("decoded: {}", String::from_utf8_lossy(round_trip));
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}
