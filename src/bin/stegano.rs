//! # Stegano Binary Entry Point
//!
//! Command-line front end for hiding text in images and reading it back.
//!
//! ## Usage
//!
//! ```bash
//! # Hide a message, protected by a generated 4-digit code
//! stegano -e -i input.png -t 'Secret message' --auth -o output.png
//!
//! # Read it back
//! stegano -d -i output.png --code 4821
//!
//! # How much fits?
//! stegano --capacity -i input.png
//! ```
//!
//! Exit codes: `0` success, `1` error, `2` the message needs an authentication code.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use log::{debug, warn, LevelFilter};
use serde::Serialize;

use stegano_lsb::common::config::StegoConfig;
use stegano_lsb::common::logging::init_logger;
use stegano_lsb::processing::analysis::{
    capacity_chars_for_bits, estimate_capacity_chars, is_likely_steganographic, read_text_file,
    validate_image_path, validate_output_path,
};
use stegano_lsb::processing::envelope::envelope_overhead;
use stegano_lsb::processing::steganography::{decode_file, decode_image, encode_file};
use stegano_lsb::{AuthCode, AuthRequest, DecodeResult, StegoError};

const EXIT_AUTH_REQUIRED: i32 = 2;

/// Command-line arguments for the stegano binary
#[derive(Parser, Debug)]
#[command(author, version, about = "Hide text in the least significant bits of an image", long_about = None)]
#[command(group(ArgGroup::new("operation").required(true).args(["encode", "decode", "capacity"])))]
struct Args {
    /// Encode text into an image
    #[arg(short, long)]
    encode: bool,

    /// Decode text from an image
    #[arg(short, long)]
    decode: bool,

    /// Show the image capacity without encoding or decoding
    #[arg(long)]
    capacity: bool,

    /// Path to the input image
    #[arg(short, long)]
    image: PathBuf,

    /// Text to encode in the image
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Text file containing data to encode
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path for the output image (encoding only, always written as PNG)
    #[arg(short, long, requires = "encode")]
    output: Option<PathBuf>,

    /// Protect the message with a 4-digit authentication code
    #[arg(long, requires = "encode")]
    auth: bool,

    /// Authentication code for a protected message
    #[arg(long, requires = "decode")]
    code: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct CapacityReport {
    width: u32,
    height: u32,
    capacity_bits: u64,
    capacity_chars: u64,
}

#[derive(Serialize)]
struct EncodeReport {
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_code: Option<String>,
}

#[derive(Serialize)]
struct DecodeReport {
    auth_required: bool,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration (defaults when no file is given)
    let config = StegoConfig::from_optional_file(args.config.as_deref())
        .context("failed to load configuration")?;

    // Initialize logging
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        config.logging.level_filter()
    };
    init_logger(level);
    debug!("Configuration: {:?}", config);

    if !validate_image_path(&args.image) {
        bail!(
            "'{}' is not a valid image file or is not supported",
            args.image.display()
        );
    }

    if args.capacity {
        run_capacity(&args)
    } else if args.encode {
        run_encode(&args, &config)
    } else {
        run_decode(&args)
    }
}

fn load_pixels(path: &Path) -> anyhow::Result<stegano_lsb::PixelBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(decode_image(&bytes)?)
}

fn run_capacity(args: &Args) -> anyhow::Result<()> {
    let pixels = load_pixels(&args.image)?;
    let report = CapacityReport {
        width: pixels.width,
        height: pixels.height,
        capacity_bits: pixels.capacity_bits(),
        capacity_chars: estimate_capacity_chars(pixels.width, pixels.height),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Image capacity: Approximately {} characters",
            report.capacity_chars
        );
    }
    Ok(())
}

fn run_encode(args: &Args, config: &StegoConfig) -> anyhow::Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(file)) => read_text_file(file)
            .with_context(|| format!("error reading text file {}", file.display()))?,
        (None, None) => bail!("encoding requires either --text or --file"),
    };

    let output = config.output.resolve(&args.image, args.output.as_deref());
    if !validate_output_path(&output) {
        bail!(
            "cannot write to '{}'. Check directory permissions",
            output.display()
        );
    }

    let auth = AuthRequest::from_flags(args.auth || config.encode.require_auth, None);
    let has_auth = auth.is_authenticated();

    if !args.json {
        println!("Encoding message into image...");
    }
    let outcome = match encode_file(&args.image, &text, &output, auth) {
        Ok(outcome) => outcome,
        Err(StegoError::CapacityExceeded { capacity, .. }) => {
            let max = capacity_chars_for_bits(capacity)
                .saturating_sub(envelope_overhead(has_auth) as u64);
            bail!(
                "text is too large for this image. Maximum capacity: ~{} characters. Your text: {} characters",
                max,
                text.chars().count()
            );
        }
        Err(e) => return Err(e.into()),
    };

    let report = EncodeReport {
        output: outcome.output_path.display().to_string(),
        auth_code: outcome.auth_code.as_ref().map(AuthCode::to_string),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Success! Encoded image saved at: {}", report.output);
        if let Some(code) = &report.auth_code {
            println!("Authentication code: {} (required to decode)", code);
        }
    }
    Ok(())
}

fn run_decode(args: &Args) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.image).with_context(|| format!("reading {}", args.image.display()))?;
    if !is_likely_steganographic(&bytes) {
        warn!("This image may not contain hidden data or uses a different steganography method");
    }

    let code = match &args.code {
        Some(code) => Some(AuthCode::parse(code)?),
        None => None,
    };

    if !args.json {
        println!("Extracting hidden message from image...");
    }
    let result = decode_file(&args.image, code.as_ref().map(AuthCode::as_str))?;

    let report = DecodeReport {
        auth_required: result == DecodeResult::AuthRequired,
        authenticated: matches!(result, DecodeResult::Authenticated(_)),
        message: result.message().map(str::to_string),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.message {
            _ if report.auth_required => {
                println!("This message is protected. Re-run with --code <4 digits>.")
            }
            Some(message) if !message.is_empty() => {
                println!("\nExtracted message:");
                println!("{}", "-".repeat(40));
                println!("{}", message);
                println!("{}", "-".repeat(40));
            }
            _ => println!("No hidden message found or message is empty."),
        }
    }

    if report.auth_required {
        process::exit(EXIT_AUTH_REQUIRED);
    }
    Ok(())
}
