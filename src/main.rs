use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use roster_analyzer::analytics::{
    country_stats, enrollment_trend, gpa_bounds, gpa_density, mean_gpa_by, summarize, top,
    value_counts, Dimension, NumericSummary, RecordFilter,
};
use roster_analyzer::loader::RosterLoader;
use roster_analyzer::models::{
    Config, DataSourceMode, Gender, RawStudentRow, StatusCategory, StudentRecord,
};
use roster_analyzer::normalizer::normalize_gender;
use roster_analyzer::planner::{
    allocate, build_intake_rows, herfindahl_index, read_applicants_file, AllocationParams,
};
use roster_analyzer::records::build_records;
use roster_analyzer::report::{
    unique_values_report, write_allocation_csv, write_density_csv, write_records_csv,
    DEFAULT_EXPORT_COLUMNS,
};

fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("country").long("country").value_name("NAME").help("Only this country"),
        Arg::new("program").long("program").value_name("NAME").help("Only this program"),
        Arg::new("status")
            .long("status")
            .value_name("STATUS")
            .help("Active, Graduated, Inactive or the local label"),
        Arg::new("gender").long("gender").value_name("M|F").help("Only this gender"),
        Arg::new("gpa-min")
            .long("gpa-min")
            .value_name("GPA")
            .value_parser(value_parser!(f64)),
        Arg::new("gpa-max")
            .long("gpa-max")
            .value_name("GPA")
            .value_parser(value_parser!(f64)),
        Arg::new("search")
            .long("search")
            .value_name("TEXT")
            .help("Case-insensitive match on name, country, college or program"),
    ]
}

fn cli() -> Command {
    Command::new("roster-analyzer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Analyzes the international-student roster and plans admission seats")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .about("Prints headline metrics and top tables")
                .args(filter_args()),
        )
        .subcommand(
            Command::new("export")
                .about("Writes the filtered student table to CSV")
                .args(filter_args()),
        )
        .subcommand(
            Command::new("plan")
                .about("Allocates admission seats across countries")
                .arg(
                    Arg::new("applicants")
                        .long("applicants")
                        .value_name("FILE")
                        .required(true)
                        .help("CSV with country and applicants columns"),
                )
                .arg(
                    Arg::new("seats")
                        .long("seats")
                        .value_name("N")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("min")
                        .long("min")
                        .value_name("N")
                        .value_parser(value_parser!(u64))
                        .help("Minimum seats per country"),
                )
                .arg(
                    Arg::new("max-seat-share")
                        .long("max-seat-share")
                        .value_name("F")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("max-post-share")
                        .long("max-post-share")
                        .value_name("F")
                        .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(Command::new("density").about("Writes the GPA density curve to CSV"))
        .subcommand(
            Command::new("unique-values").about("Lists distinct raw values of descriptive columns"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        Config::default().save_to_file(config_file)?;
        println!(
            "⚠️  Please edit {} and point data_file at the roster export, then run again.",
            config_file
        );
        return Ok(());
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output_dir = config.output_directory();
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir))?;

    let rows = load_rows(&config).await?;
    println!("   ✅ Loaded {} roster rows", rows.len());

    match matches.subcommand() {
        Some(("summary", sub)) => {
            let records = build_records(&rows);
            let filter = record_filter(sub)?;
            print_summary(&filter.apply(&records));
        }
        Some(("export", sub)) => {
            let records = build_records(&rows);
            let filter = record_filter(sub)?;
            let selected = filter.apply(&records);
            let file_name = format!(
                "international_students_{}.csv",
                Local::now().format("%Y%m%d")
            );
            let path = Path::new(output_dir).join(file_name);
            write_records_csv(&path, &selected, DEFAULT_EXPORT_COLUMNS)?;
            println!("📄 Exported {} students to {}", selected.len(), path.display());
        }
        Some(("plan", sub)) => {
            let records = build_records(&rows);
            run_plan(&config, sub, &records, output_dir)?;
        }
        Some(("density", _)) => {
            let records = build_records(&rows);
            let all: Vec<&StudentRecord> = records.iter().collect();
            let (xs, ys) = gpa_density(&all);
            let path = Path::new(output_dir).join("gpa_density.csv");
            write_density_csv(&path, &xs, &ys)?;
            println!("📈 Density curve with {} points written to {}", xs.len(), path.display());
        }
        Some(("unique-values", _)) => {
            let source = match config.data_source_mode {
                DataSourceMode::Local => config.data_file(),
                DataSourceMode::Internet => config.data_url.as_deref().unwrap_or_default(),
            };
            let path = Path::new(output_dir).join("unique_values.txt");
            fs::write(&path, unique_values_report(source, &rows))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("📄 Unique values written to {}", path.display());
        }
        _ => unreachable!("a subcommand is required"),
    }

    println!("\n✅ Done!");
    Ok(())
}

async fn load_rows(config: &Config) -> Result<Vec<RawStudentRow>> {
    let loader = RosterLoader::new();
    match config.data_source_mode {
        DataSourceMode::Local => {
            println!("📂 Reading roster from: {}", config.data_file());
            loader
                .load_file(config.data_file())
                .with_context(|| format!("Failed to load roster {}", config.data_file()))
        }
        DataSourceMode::Internet => {
            let url = config.data_url.as_deref().unwrap_or_default();
            println!("🌐 Downloading roster from: {}", url);
            loader
                .fetch_url(url)
                .await
                .with_context(|| format!("Failed to download roster {}", url))
        }
    }
}

fn record_filter(matches: &ArgMatches) -> Result<RecordFilter> {
    let status = match matches.get_one::<String>("status") {
        Some(s) => match StatusCategory::parse(s) {
            Some(status) => Some(status),
            None => bail!("Unknown status: {}", s),
        },
        None => None,
    };
    let gender = match matches.get_one::<String>("gender") {
        Some(g) => match normalize_gender(Some(g.as_str())) {
            Gender::Undefined => bail!("Unknown gender: {} (expected M or F)", g),
            gender => Some(gender),
        },
        None => None,
    };

    let gpa_min = matches.get_one::<f64>("gpa-min").copied();
    let gpa_max = matches.get_one::<f64>("gpa-max").copied();
    let gpa_range = match (gpa_min, gpa_max) {
        (None, None) => None,
        (lo, hi) => Some((lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))),
    };

    Ok(RecordFilter {
        country: matches.get_one::<String>("country").cloned(),
        program: matches.get_one::<String>("program").cloned(),
        status,
        gender,
        gpa_range,
        search: matches.get_one::<String>("search").cloned(),
    })
}

fn print_summary(records: &[&StudentRecord]) {
    let summary = summarize(records);
    println!("\n📊 SUMMARY");
    println!("==========");
    println!("Students:   {}", summary.total);
    println!("Active:     {}", summary.active);
    println!("Graduated:  {}", summary.graduated);
    match summary.mean_gpa {
        Some(gpa) => println!("Mean GPA:   {:.2}", gpa),
        None => println!("Mean GPA:   -"),
    }
    println!("Countries:  {}", summary.countries);

    let (lo, hi) = gpa_bounds(records.iter().copied());
    println!("GPA range:  {:.2} - {:.2}", lo, hi);

    let gpas: Vec<f64> = records.iter().filter_map(|r| r.gpa).collect();
    let hours: Vec<f64> = records.iter().filter_map(|r| r.hours).collect();
    println!(
        "\n   {:<8} {:>6} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (name, values) in [("GPA", &gpas), ("Hours", &hours)] {
        if let Some(s) = NumericSummary::describe(values) {
            println!(
                "   {:<8} {:>6} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2}",
                name, s.count, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max
            );
        }
    }

    println!("\n🌍 Top countries:");
    for stats in country_stats(records).iter().take(10) {
        let gpa = stats
            .mean_gpa
            .map(|g| format!("{:.2}", g))
            .unwrap_or_else(|| "-".to_string());
        println!("   {:<30} {:>6}  GPA {}", stats.country, stats.students, gpa);
    }

    for (title, dimension) in [
        ("🗺️  Continents", Dimension::Continent),
        ("📚 Top programs", Dimension::Program),
        ("🏛️  Colleges", Dimension::College),
        ("📌 Status", Dimension::Status),
        ("👥 Gender", Dimension::Gender),
        ("💰 Funding", Dimension::Funding),
    ] {
        println!("\n{}:", title);
        for (label, count) in top(value_counts(records, dimension), 10) {
            println!("   {:<40} {:>6}", label, count);
        }
    }

    println!("\n🎓 Mean GPA by college:");
    for (college, gpa) in mean_gpa_by(records, Dimension::College).iter().take(10) {
        println!("   {:<40} {:>6.2}", college, gpa);
    }

    println!("\n📅 Enrollment by year:");
    for (year, count) in enrollment_trend(records) {
        println!("   {} {:>6}", year, count);
    }
}

fn run_plan(
    config: &Config,
    matches: &ArgMatches,
    records: &[StudentRecord],
    output_dir: &str,
) -> Result<()> {
    let applicants_path = matches
        .get_one::<String>("applicants")
        .context("--applicants is required")?;
    let applicants = read_applicants_file(applicants_path)
        .with_context(|| format!("Failed to read applicant table {}", applicants_path))?;
    let intake = build_intake_rows(&applicants, records, config.planner.count_active_only)?;

    let mut params = AllocationParams::from(&config.planner);
    if let Some(seats) = matches.get_one::<u64>("seats") {
        params.seats = *seats;
    }
    if let Some(min) = matches.get_one::<u64>("min") {
        params.min_per_country = *min;
    }
    if let Some(share) = matches.get_one::<f64>("max-seat-share") {
        params.max_seat_share = *share;
    }
    if let Some(share) = matches.get_one::<f64>("max-post-share") {
        params.max_post_share = *share;
    }
    for (name, share) in [
        ("max-seat-share", params.max_seat_share),
        ("max-post-share", params.max_post_share),
    ] {
        if !(share > 0.0 && share <= 1.0) {
            bail!("--{} must be in (0, 1], got {}", name, share);
        }
    }

    println!(
        "\n🎯 Allocating {} seats across {} countries (min {}, seat cap {:.0}%, post cap {:.0}%)",
        params.seats,
        intake.len(),
        params.min_per_country,
        params.max_seat_share * 100.0,
        params.max_post_share * 100.0
    );

    let plan = allocate(&intake, &params);
    let allocated: u64 = plan.iter().map(|r| r.target_admits).sum();

    println!(
        "   {:<30} {:>10} {:>8} {:>8} {:>8}",
        "Country", "Applicants", "Current", "Admits", "Share"
    );
    for row in &plan {
        println!(
            "   {:<30} {:>10} {:>8} {:>8} {:>7.1}%",
            row.country,
            row.applicants,
            row.current,
            row.target_admits,
            row.post_share * 100.0
        );
    }

    let before: Vec<u64> = intake.iter().map(|r| r.current).collect();
    let after: Vec<u64> = plan.iter().map(|r| r.post_total).collect();
    println!("\n📊 Seats allocated: {} of {}", allocated, params.seats);
    println!("📊 Concentration (HHI) before: {:.4}", herfindahl_index(&before));
    println!("📊 Concentration (HHI) after:  {:.4}", herfindahl_index(&after));
    if allocated < params.seats {
        println!("⚠️  Caps left {} seats unallocated", params.seats - allocated);
    }

    let path = Path::new(output_dir).join("allocation_plan.csv");
    write_allocation_csv(&path, &plan)?;
    println!("📄 Plan written to {}", path.display());
    Ok(())
}
