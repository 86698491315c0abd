use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kabala_core::total_amount;
use kabala_import::import::{load_csv, suggest_mappings, validate_sheet};
use kabala_import::{
    apply_overrides, build_receipts, map_columns, parse_override, ImportReport, ImportSettings,
    PresetSuggestions,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kabala")]
#[command(about = "Map spreadsheet columns to receipt fields and validate the rows")]
#[command(version)]
struct Args {
    /// CSV export to import
    input: PathBuf,

    /// TOML file with import settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manual mapping as "Column=field", e.g. "Paid by=customerName". Repeatable.
    #[arg(short, long = "map", value_name = "COLUMN=FIELD")]
    map: Vec<String>,

    /// JSON list of column mapping suggestions to use instead of keyword inference
    #[arg(long)]
    suggestions: Option<PathBuf>,

    /// Print the receipts built from the valid rows instead of the report
    #[arg(long)]
    receipts: bool,

    /// Number of the first receipt
    #[arg(long)]
    first_number: Option<u64>,

    /// 1-based row holding the column titles
    #[arg(long)]
    header_row: Option<usize>,

    /// Field delimiter (use "\t" for tab-separated files)
    #[arg(long)]
    delimiter: Option<String>,
}

impl Args {
    fn settings(&self) -> anyhow::Result<ImportSettings> {
        let mut settings = match &self.config {
            Some(path) => ImportSettings::load(path)
                .with_context(|| format!("reading settings from {}", path.display()))?,
            None => ImportSettings::default(),
        };
        if let Some(n) = self.first_number {
            settings.first_receipt_number = n;
        }
        if let Some(row) = self.header_row {
            settings.header_row = row;
        }
        if let Some(delimiter) = &self.delimiter {
            settings.delimiter = delimiter.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let settings = args.settings()?;

    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let sheet = load_csv(BufReader::new(file), &settings)
        .with_context(|| format!("reading {}", args.input.display()))?;
    if sheet.is_empty() {
        warn!(input = %args.input.display(), "sheet has no data rows");
    }

    let mappings = match &args.suggestions {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading suggestions from {}", path.display()))?;
            let preset = PresetSuggestions::from_json(&json)
                .with_context(|| format!("parsing suggestions from {}", path.display()))?;
            map_columns(&preset, &sheet.headers)
        }
        None => suggest_mappings(&sheet),
    };

    let overrides = args
        .map
        .iter()
        .map(|s| parse_override(s))
        .collect::<Result<Vec<_>, _>>()?;
    let mappings = apply_overrides(&mappings, &overrides)?;

    let partition = validate_sheet(&sheet, &mappings, &settings);

    if args.receipts {
        let batch = build_receipts(&partition.valid, &mappings, settings.first_receipt_number);
        for rejected in &batch.rejected {
            warn!("{rejected}");
        }
        info!(
            count = batch.receipts.len(),
            total = %total_amount(&batch.receipts),
            skipped = partition.invalid.len() + batch.rejected.len(),
            "receipts ready"
        );
        return Ok(serde_json::to_string_pretty(&batch.receipts)?);
    }

    let report = ImportReport::new(&mappings, &partition);
    info!("{}", report.to_string().trim_end());
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = run(&args)?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kabala").chain(argv.iter().copied())).unwrap()
    }

    const SAMPLE: &str = "Name,Sum,Date\nDana,100,01/01/2025\n,200,02/01/2025\n";

    // ── argument parsing ──────────────────────────────────────────────────────

    #[test]
    fn parses_repeated_map_flags() {
        let a = args(&["in.csv", "--map", "A=amount", "-m", "B=date", "--receipts"]);
        assert_eq!(a.input, PathBuf::from("in.csv"));
        assert_eq!(a.map, vec!["A=amount", "B=date"]);
        assert!(a.receipts);
        assert!(a.config.is_none());
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["kabala"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let mut config = NamedTempFile::new().unwrap();
        writeln!(config, "first_receipt_number = 10\nheader_row = 2").unwrap();
        let path = config.path().to_str().unwrap();
        let a = args(&["in.csv", "--config", path, "--first-number", "77"]);
        let settings = a.settings().unwrap();
        assert_eq!(settings.first_receipt_number, 77);
        assert_eq!(settings.header_row, 2);
    }

    #[test]
    fn bad_delimiter_flag_is_rejected() {
        assert!(args(&["in.csv", "--delimiter", ";;"]).settings().is_err());
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn report_for_sample_file() {
        let file = csv_file(SAMPLE);
        let out = run(&args(&[file.path().to_str().unwrap()])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["totalRows"], 2);
        assert_eq!(json["validRows"], 1);
        assert_eq!(json["issues"][0]["rowNumber"], 3);
        assert_eq!(json["issues"][0]["errors"][0]["message"], "name missing");
        assert_eq!(json["mappings"][1]["receiptField"], "amount");
    }

    #[test]
    fn receipts_are_numbered_from_first_number() {
        let file = csv_file(SAMPLE);
        let path = file.path().to_str().unwrap();
        let out = run(&args(&[path, "--receipts", "--first-number", "42"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let receipts = json.as_array().unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0]["receiptNumber"], 42);
        assert_eq!(receipts[0]["customerName"], "Dana");
        assert_eq!(receipts[0]["date"], "2025-01-01");
    }

    #[test]
    fn manual_override_rescues_unknown_header() {
        let file = csv_file("Client,Paid,When\nDana,100,2025-01-01\n");
        let path = file.path().to_str().unwrap();

        let out = run(&args(&[path])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["validRows"], 0);

        let out = run(&args(&[path, "--map", "Paid=amount", "--map", "When=date"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["validRows"], 1);
        assert_eq!(json["mappings"][1]["isManual"], true);
        assert_eq!(json["mappings"][1]["confidence"], 1.0);
    }

    #[test]
    fn suggestions_file_replaces_inference() {
        let file = csv_file("Who,How much,When\nDana,100,01/01/2025\n");
        let mut suggestions = NamedTempFile::new().unwrap();
        write!(
            suggestions,
            r#"[
                {{"excelColumn": "Who", "receiptField": "customerName", "confidence": 0.8, "isManual": false}},
                {{"excelColumn": "How much", "receiptField": "amount", "confidence": 0.75, "isManual": false}},
                {{"excelColumn": "When", "receiptField": "date", "confidence": 0.75, "isManual": false}}
            ]"#
        )
        .unwrap();
        let out = run(&args(&[
            file.path().to_str().unwrap(),
            "--suggestions",
            suggestions.path().to_str().unwrap(),
        ]))
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["validRows"], 1);
        assert_eq!(json["unmappedRequired"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn unrepresentable_amount_is_skipped_not_fatal() {
        let file = csv_file(
            "Name,Sum,Date\nDana,100,01/01/2025\nAvi,1e30,02/01/2025\nNoa,50,03/01/2025\n",
        );
        let path = file.path().to_str().unwrap();
        let out = run(&args(&[path, "--receipts"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let receipts = json.as_array().unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0]["customerName"], "Dana");
        assert_eq!(receipts[1]["customerName"], "Noa");
        assert_eq!(receipts[1]["receiptNumber"], 2);
    }

    #[test]
    fn unknown_override_column_fails() {
        let file = csv_file(SAMPLE);
        let path = file.path().to_str().unwrap();
        let err = run(&args(&[path, "--map", "Ghost=amount"])).unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn missing_input_fails() {
        assert!(run(&args(&["/definitely/not/here.csv"])).is_err());
    }
}
