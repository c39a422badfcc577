use chrono::Utc;
use clap::Args;
use credilens::config::AppConfig;
use credilens::error::AppError;
use credilens::filing::FilingImporter;
use credilens::pipeline::{new_doc_id, write_ratio_csv, Analysis, AnalysisPipeline, ArtifactStore};
use credilens::qa::run_all_checks;
use credilens::ratios::{compute_ratios, RatioReport, RatioResult, RatioTable, RatioUnit};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Extraction payload (JSON) produced by the document extraction service
    pub(crate) payload: PathBuf,
    /// Reuse a document id instead of generating one
    #[arg(long)]
    pub(crate) doc_id: Option<String>,
    /// Scoring configuration (YAML) overriding the configured one
    #[arg(long)]
    pub(crate) scoring: Option<PathBuf>,
    /// Outputs directory overriding <storage>/outputs
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Print the full analysis as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RatiosArgs {
    /// Extraction payload (JSON)
    pub(crate) payload: PathBuf,
    /// Emit CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Extraction payload (JSON)
    pub(crate) payload: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct RecentArgs {
    /// Maximum number of documents to list
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
}

pub(crate) fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        payload,
        doc_id,
        scoring,
        out,
        json,
    } = args;

    let mut analysis_config = config.analysis.clone();
    if scoring.is_some() {
        analysis_config.scoring_config = scoring;
    }
    let pipeline = AnalysisPipeline::from_config(&analysis_config)?;

    let document = FilingImporter::from_path(&payload)?;
    let now = Utc::now();
    let doc_id = doc_id.unwrap_or_else(|| new_doc_id(now));
    let analysis = pipeline.analyze(&doc_id, document);

    let store = ArtifactStore::new(out.unwrap_or_else(|| config.storage.outputs_dir()));
    let written = store.write(&analysis, pipeline.ratio_table(), now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        render_analysis(&analysis, pipeline.ratio_table());
        println!("\nArtifacts: {}", written.display());
    }
    Ok(())
}

pub(crate) fn run_ratios(config: &AppConfig, args: RatiosArgs) -> Result<(), AppError> {
    let table = match &config.analysis.ratio_table {
        Some(path) => RatioTable::from_path(path)?,
        None => RatioTable::standard(),
    };
    let document = FilingImporter::from_path(&args.payload)?;
    let report = compute_ratios(&document, &table);

    if args.csv {
        write_ratio_csv(std::io::stdout().lock(), &report, &table)?;
    } else {
        render_ratios(&report, &table);
    }
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let document = FilingImporter::from_path(&args.payload)?;
    let issues = run_all_checks(&document);

    println!("QA checks");
    for issue in &issues {
        println!("- {}", issue.summary());
    }
    Ok(())
}

pub(crate) fn run_recent(config: &AppConfig, args: RecentArgs) -> Result<(), AppError> {
    let store = ArtifactStore::new(config.storage.outputs_dir());
    let ids = store.recent(args.limit)?;

    if ids.is_empty() {
        println!("No analyses under {}", store.root().display());
        return Ok(());
    }

    println!("Recent analyses");
    for id in ids {
        match store.index(&id) {
            Ok(index) => println!(
                "- {} | {} | {}",
                index.doc_id,
                index.company.as_deref().unwrap_or("unknown company"),
                index.generated_at.to_rfc3339()
            ),
            Err(_) => println!("- {id} | (no index)"),
        }
    }
    Ok(())
}

fn render_analysis(analysis: &Analysis, table: &RatioTable) {
    let company = analysis
        .document
        .company
        .name
        .as_deref()
        .unwrap_or("unknown company");
    println!("Credit analysis for {company} ({})", analysis.doc_id);

    match analysis.score.final_score {
        Some(score) => println!("Final score: {score:.2}"),
        None => println!("Final score: n/a (insufficient evidence)"),
    }

    println!("\nPillars");
    for (pillar, scored) in &analysis.score.pillars {
        let score = scored
            .score
            .map(|value| format!("{value:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        let note = if scored.dampened {
            format!(" (dampened, {} ratios missing)", scored.missing_input_count)
        } else {
            String::new()
        };
        println!("- {pillar}: {score}{note}");
    }

    println!();
    render_ratios(&analysis.ratios, table);

    println!("\nQA checks");
    for issue in &analysis.qa_issues {
        println!("- {}", issue.summary());
    }
}

fn render_ratios(report: &RatioReport, table: &RatioTable) {
    println!("Ratios");
    for spec in table.specs() {
        if let Some(result) = report.get(&spec.key) {
            println!("- {}: {}", spec.key, format_ratio(result));
        }
    }
}

fn format_ratio(result: &RatioResult) -> String {
    match (result.value, result.unit) {
        (None, _) => "n/a".to_string(),
        (Some(value), RatioUnit::Percent) => format!("{:.2}%", value * 100.0),
        (Some(value), RatioUnit::Multiple) => format!("{value:.2}x"),
    }
}
