// ==========================================
// 表格数据导入 - 命令行入口
// ==========================================
// 用法:
//   sheet-loader --db app.sqlite language.csv tag.csv
//   sheet-loader --db app.sqlite --sorting simple --no-update book.xlsx
//   sheet-loader --db app.sqlite --json book.xlsx > report.json
// 说明: 整批在一个事务中执行；有任何错误诊断时退出码非 0
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheet_loader::{
    db, logging, DatabaseLoader, LoadReport, LoaderConfig, SortingKind, SqliteIntrospector,
    SqliteStatementExecutor,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sheet-loader")]
#[command(about = "Load CSV / Excel sheets into existing database tables in foreign-key order")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long)]
    db: PathBuf,

    /// JSON config file (defaults to <config_dir>/sheet-loader/config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sheet ordering strategy (overrides config)
    #[arg(short, long)]
    sorting: Option<SortingArg>,

    /// Skip the second pass that fills nullable columns
    #[arg(long)]
    no_update: bool,

    /// Print the report as JSON (logs switch to JSON too)
    #[arg(long)]
    json: bool,

    /// Files to load (.csv, .xlsx, .xls)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortingArg {
    Dependency,
    Simple,
}

impl From<SortingArg> for SortingKind {
    fn from(arg: SortingArg) -> Self {
        match arg {
            SortingArg::Dependency => SortingKind::Dependency,
            SortingArg::Simple => SortingKind::Simple,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json);

    info!("{} {}", sheet_loader::APP_NAME, sheet_loader::VERSION);

    match run(&cli) {
        Ok(report) if report.has_errors() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "加载失败");
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<LoadReport> {
    let mut config = LoaderConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(sorting) = cli.sorting {
        config.sorting = sorting.into();
    }
    if cli.no_update {
        config.update_pass = false;
    }

    let book = config
        .book_reader()
        .read_book(&cli.files)
        .context("failed to read input files")?;

    let db_path = cli.db.to_string_lossy();
    let conn = db::open_shared_connection(&db_path)
        .with_context(|| format!("failed to open database {}", db_path))?;
    let introspector = Arc::new(SqliteIntrospector::new(conn.clone()));
    let executor = Arc::new(SqliteStatementExecutor::new(conn));

    let loader = DatabaseLoader::new(introspector, executor.clone(), &config);

    let report = executor.in_transaction(|| loader.load(book))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(report)
}
