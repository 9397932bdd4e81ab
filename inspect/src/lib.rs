use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use runtime_metadata::{
    decode_hex, decode_jsonrpc_result, encode_prefixed, parse_raw_metadata, EventId, MetadataV13,
    MAGIC_NUMBER,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, anyhow::Error>;

/// Inspect a runtime metadata dump, as returned by `state_getMetadata`.
#[derive(Debug, Parser)]
#[command(name = "metadata-inspect", version)]
pub struct Config {
    /// Format of the dump. `auto` detects raw, JSON-RPC and hex dumps.
    #[arg(short, long, value_enum, default_value_t = Format::Auto)]
    pub format: Format,
    /// Path to the metadata dump.
    pub path: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Auto,
    Hex,
    Json,
    Raw,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all modules with their index and sections.
    Modules,
    /// Resolve a call of the form `Module.method` into its call index.
    Call { call: String },
    /// Resolve an event id into the module and event names.
    Event { section: u8, method: u8 },
    /// Show a storage entry and the hashers of its key components.
    Storage { prefix: String, entry: String },
    /// Build the storage key of an entry from hex encoded key components.
    Key {
        prefix: String,
        entry: String,
        keys: Vec<String>,
    },
    /// Check that re-encoding the decoded document reproduces the dump.
    Roundtrip,
    /// Print the decoded document as JSON.
    Json,
}

/// Reads the dump and returns the raw metadata bytes.
pub fn load_raw(path: &Path, format: Format) -> Result<Vec<u8>> {
    let content =
        fs::read(path).with_context(|| format!("failed to read metadata from {}", path.display()))?;

    let format = match format {
        Format::Auto => detect_format(&content),
        format => format,
    };
    log::debug!("Reading {} as {:?}", path.display(), format);

    match format {
        Format::Raw | Format::Auto => Ok(content),
        Format::Hex => Ok(decode_hex(&content)?),
        Format::Json => Ok(decode_jsonrpc_result(&content)?),
    }
}

fn detect_format(content: &[u8]) -> Format {
    let trimmed = content
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(&content[..0], |start| &content[start..]);

    if content.starts_with(&MAGIC_NUMBER[..]) {
        Format::Raw
    } else if trimmed.starts_with(b"{") {
        Format::Json
    } else if trimmed
        .iter()
        .all(|b| b.is_ascii_hexdigit() || *b == b'x' || b.is_ascii_whitespace())
    {
        Format::Hex
    } else {
        Format::Raw
    }
}

pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let raw = load_raw(&config.path, config.format)?;
    let metadata = parse_raw_metadata(&raw)?;

    match &config.command {
        Command::Modules => print_modules(&metadata, out)?,
        Command::Call { call } => {
            let index = metadata.find_call_index(call)?;
            writeln!(out, "{} => [{}, {}]", call, index.section_index, index.method_index)?;
        }
        Command::Event { section, method } => {
            let (module, event) = metadata.find_event_names(EventId {
                section_index: *section,
                method_index: *method,
            })?;
            writeln!(out, "[{}, {}] => {}.{}", section, method, module, event)?;
        }
        Command::Storage { prefix, entry } => {
            let meta = metadata.find_storage_entry(prefix, entry)?;
            serde_json::to_writer_pretty(&mut *out, meta)?;
            writeln!(out)?;
            for position in 0..meta.key_count() {
                writeln!(out, "key {}: {:?}", position, meta.hasher_at(position)?)?;
            }
        }
        Command::Key {
            prefix,
            entry,
            keys,
        } => {
            let keys = keys
                .iter()
                .map(|key| decode_hex(key).with_context(|| format!("invalid key `{}`", key)))
                .collect::<Result<Vec<_>>>()?;
            let key = metadata.storage_key(prefix, entry, &keys)?;
            writeln!(out, "0x{}", hex::encode(key))?;
        }
        Command::Roundtrip => {
            let encoded = encode_prefixed(&metadata);
            let expected = if raw.starts_with(&MAGIC_NUMBER[..]) {
                &encoded[..]
            } else {
                &encoded[MAGIC_NUMBER.len()..]
            };

            if expected != raw.as_slice() {
                bail!("re-encoded metadata differs from {}", config.path.display());
            }
            writeln!(out, "round trip ok ({} bytes)", raw.len())?;
        }
        Command::Json => {
            serde_json::to_writer_pretty(&mut *out, &metadata)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn print_modules<W: Write>(metadata: &MetadataV13, out: &mut W) -> Result<()> {
    for module in &metadata.modules {
        writeln!(
            out,
            "{:>3} {} storage={} calls={} events={} constants={} errors={}",
            module.index,
            module.name,
            module.storage.as_ref().map_or(0, |s| s.entries.len()),
            module.calls.as_ref().map_or(0, |c| c.len()),
            module.events.as_ref().map_or(0, |e| e.len()),
            module.constants.len(),
            module.errors.len(),
        )?;
    }

    Ok(())
}
