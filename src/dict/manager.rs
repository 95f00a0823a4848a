use crate::checker::dictionary::Dictionary;
use anyhow::{Context, Result};
use colored::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// Hunspell assets from the LibreOffice dictionaries repository, pinned to a
// release tag so downloads stay reproducible.
const HUNSPELL_BASE_URL: &str =
    "https://raw.githubusercontent.com/LibreOffice/dictionaries/libreoffice-7.6.0.1";
const ASSET_VERSION: &str = "libreoffice-7.6.0.1";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    dictionaries: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestEntry {
    version: String,
    word_count: usize,
    dic_sha256: String,
    aff_sha256: String,
}

fn asset_stem(language: &str) -> Result<String> {
    match language {
        "en_US" | "en_GB" => Ok(format!("en/{}", language)),
        other => anyhow::bail!(
            "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
            other
        ),
    }
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;

    if !data_dir.exists() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "texscribe dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    let entries = fs::read_dir(&data_dir)?;
    let mut found_any = false;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("dict") {
            found_any = true;
            let language = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown");

            let metadata = fs::metadata(&path)?;
            let size_kb = metadata.len() / 1024;

            println!(
                "  {} {} ({})",
                "✓".green(),
                language.cyan().bold(),
                format!("{}KB", size_kb).dimmed()
            );
        }
    }

    if !found_any {
        println!("{}", "No dictionaries found.".yellow());
    }

    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

pub fn download_dictionary(language: &str) -> Result<()> {
    println!(
        "{} dictionary for {} (assets: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        ASSET_VERSION.dimmed()
    );

    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;
    let cache_dir = crate::config::Config::cache_dir().context("Failed to get cache directory")?;

    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let stem = asset_stem(language)?;
    let dic_url = format!("{}/{}.dic", HUNSPELL_BASE_URL, stem);
    let aff_url = format!("{}/{}.aff", HUNSPELL_BASE_URL, stem);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );

    pb.set_message(format!("Fetching {}.dic...", language));
    let dic_content = fetch_text(&dic_url)?;
    pb.set_message(format!("Fetching {}.aff...", language));
    let aff_content = fetch_text(&aff_url)?;
    pb.finish_with_message("Download complete");

    println!("{}", "Building dictionary...".cyan());
    let words = Dictionary::words_from_dic(&dic_content);
    println!("Found {} words", words.len().to_string().yellow());

    let dict_path = data_dir.join(format!("{}.dict", language));
    Dictionary::build_from_words(&words, &dict_path)?;

    // Keep the raw assets compressed in the cache and record their
    // checksums so `dict info` can verify provenance.
    write_gz(&cache_dir.join(format!("{}.dic.gz", language)), &dic_content)?;
    write_gz(&cache_dir.join(format!("{}.aff.gz", language)), &aff_content)?;

    let mut manifest = read_manifest(&cache_dir);
    manifest.dictionaries.insert(
        language.to_string(),
        ManifestEntry {
            version: ASSET_VERSION.to_string(),
            word_count: words.len(),
            dic_sha256: sha256_hex(dic_content.as_bytes()),
            aff_sha256: sha256_hex(aff_content.as_bytes()),
        },
    );
    write_manifest(&cache_dir, &manifest)?;

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(())
}

pub fn update_dictionaries() -> Result<()> {
    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;

    if !data_dir.exists() {
        println!("{}", "No dictionaries installed.".yellow());
        return Ok(());
    }

    let entries = fs::read_dir(&data_dir)?;
    let mut languages = Vec::new();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("dict") {
            if let Some(language) = path.file_stem().and_then(|s| s.to_str()) {
                languages.push(language.to_string());
            }
        }
    }

    if languages.is_empty() {
        println!("{}", "No dictionaries to update.".yellow());
        return Ok(());
    }

    println!(
        "{} {} {}...",
        "Updating".cyan().bold(),
        languages.len(),
        if languages.len() == 1 {
            "dictionary"
        } else {
            "dictionaries"
        }
    );
    println!();

    for language in languages {
        download_dictionary(&language)?;
        println!();
    }

    println!("{} All dictionaries updated!", "✓".green().bold());

    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;

    let dict_path = data_dir.join(format!("{}.dict", language));

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("texscribe dict download {}", language).cyan()
        );
        return Ok(());
    }

    let metadata = fs::metadata(&dict_path)?;

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Path: {}", dict_path.display());
    println!("  Size: {} KB", metadata.len() / 1024);
    println!("  Format: FST (Finite State Transducer)");

    if let Some(cache_dir) = crate::config::Config::cache_dir() {
        let manifest = read_manifest(&cache_dir);
        match manifest.dictionaries.get(language) {
            Some(entry) => {
                println!("  Assets: {}", entry.version);
                println!("  Words: {}", entry.word_count);
                println!("  .dic sha256: {}", entry.dic_sha256);
                println!("  .aff sha256: {}", entry.aff_sha256);
            }
            None => {
                println!("  Assets: {}", "embedded bootstrap wordlist".yellow());
            }
        }
    }

    Ok(())
}

fn fetch_text(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to download {}: HTTP {}", url, response.status());
    }

    Ok(response.text()?)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_gz(path: &Path, content: &str) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create cache file: {}", path.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(content.as_bytes())
        .context("Failed to write cache file")?;
    encoder.finish().context("Failed to finish cache file")?;
    Ok(())
}

fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("manifest.json")
}

fn read_manifest(cache_dir: &Path) -> Manifest {
    fs::read_to_string(manifest_path(cache_dir))
        .ok()
        .and_then(|contents| serde_json::from_str(&contents).ok())
        .unwrap_or_default()
}

fn write_manifest(cache_dir: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(manifest_path(cache_dir), json).context("Failed to write manifest")?;
    Ok(())
}
