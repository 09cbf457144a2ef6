//! Household Planner CLI
//!
//! Command-line interface for running tax, projection and serviceability
//! calculations over household profile files

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use household_planner::assumptions::FinancialYear;
use household_planner::profile::{load_households, load_profile};
use household_planner::serviceability::CapacityRequest;
use household_planner::{
    AssumptionSet, FinancialProfile, MonthlySurplus, PlanResult, PlanRunner, ProposedLoan, Schedules,
};

#[derive(Parser)]
#[command(
    name = "household-planner",
    version,
    about = "Tax, retirement projection and loan serviceability for household profiles"
)]
struct Cli {
    /// Directory of schedule CSV tables (built-in 2024-25 tables when omitted)
    #[arg(long, global = true)]
    schedules: Option<PathBuf>,

    /// JSON file with economic assumptions (standard set when omitted)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Calculation date (YYYY-MM-DD), checked against the schedule's financial year
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annual tax position for a profile
    Tax {
        /// Profile JSON file
        profile: PathBuf,
    },

    /// Project a profile to retirement
    Project {
        /// Profile JSON file
        profile: PathBuf,
        /// Project a fixed number of years instead of to the retirement age
        #[arg(short, long)]
        years: Option<u32>,
    },

    /// Maximum serviceable loan and property value
    Capacity {
        /// Profile JSON file
        profile: PathBuf,
        /// Assessment rate in percent (lending policy rate when omitted)
        #[arg(short, long)]
        rate: Option<f64>,
        /// Loan term in years (lending policy term when omitted)
        #[arg(short, long)]
        term: Option<f64>,
        /// Maximum loan-to-value ratio, e.g. 0.8
        #[arg(long)]
        lvr: Option<f64>,
        /// Gross rental yield of the purchase in percent
        #[arg(long)]
        rental_yield: Option<f64>,
        /// Property running costs as a share of rent
        #[arg(long)]
        expense_ratio: Option<f64>,
    },

    /// Assess a proposed loan
    Assess {
        /// Profile JSON file
        profile: PathBuf,
        /// Loan amount
        #[arg(short, long)]
        amount: f64,
        /// Interest rate in percent
        #[arg(short, long)]
        rate: f64,
        /// Loan term in years
        #[arg(short, long, default_value_t = 30.0)]
        term: f64,
    },

    /// Evaluate every household in a summary CSV
    Batch {
        /// Households CSV file
        households: PathBuf,
        /// Write summaries to this CSV instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runner = build_runner(&cli)?;

    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let schedule_year = runner.schedules().tax.financial_year;
    if FinancialYear::containing(as_of) != schedule_year {
        log::warn!(
            "{} falls in {}, but the loaded tax schedule is for {}",
            as_of,
            FinancialYear::containing(as_of),
            schedule_year
        );
    }

    match &cli.command {
        Commands::Tax { profile } => {
            let profile = read_profile(profile)?;
            let result = runner.tax_engine().calculate(&profile);
            if cli.json {
                return print_json(&result);
            }
            println!("Tax position: {} ({})", display_name(&profile), schedule_year);
            println!("  Gross income:      ${:>12.2}", result.gross_income);
            println!("  Deductions:        ${:>12.2}", result.total_deductions);
            println!("  Taxable income:    ${:>12.2}", result.taxable_income);
            println!("  Income tax:        ${:>12.2}", result.income_tax);
            println!("  Levy:              ${:>12.2}", result.levy);
            println!("  Levy surcharge:    ${:>12.2}", result.levy_surcharge);
            println!("  Study loan:        ${:>12.2}", result.repayment);
            println!("  Franking offset:   ${:>12.2}", result.franking_offset);
            println!("  Total tax:         ${:>12.2}", result.total_tax);
            println!("  After-tax income:  ${:>12.2}", result.after_tax_income);
            println!("  Marginal rate:      {:>12.2}%", result.marginal_rate);
            println!("  Average rate:       {:>12.2}%", result.average_rate);
            if result.net_rental_loss > 0.0 {
                println!(
                    "  Negative gearing:  ${:>12.2} loss, ${:.2} saved",
                    result.net_rental_loss, result.negative_gearing_benefit
                );
            }
        }

        Commands::Project { profile, years } => {
            let profile = read_profile(profile)?;
            let engine = runner.projection_engine();
            let result = match years {
                Some(years) => engine.project_years(&profile, *years),
                None => engine.project(&profile)?,
            };
            if cli.json {
                return print_json(&result);
            }
            let future = &result.future;
            println!(
                "Projection: {} over {} years",
                display_name(&profile),
                result.years_to_target
            );
            println!("  Net worth today:       ${:>14.2}", result.current.net_worth);
            println!("  Monthly cashflow:      ${:>14.2}", result.current.monthly_cashflow);
            println!("  Retirement fund:       ${:>14.2}", future.retirement_fund);
            println!("  Shares:                ${:>14.2}", future.shares);
            println!("  Voluntary savings:     ${:>14.2}", future.voluntary_savings);
            println!("  Property equity:       ${:>14.2}", future.property_equity);
            println!("  Savings:               ${:>14.2}", future.savings);
            println!("  Lump sum:              ${:>14.2}", future.lump_sum);
            println!("  Net worth at target:   ${:>14.2}", future.net_worth);
            println!("  Projected income:      ${:>14.2}", result.projected_income);
            println!("  Required income:       ${:>14.2}", result.required_income);
            println!(
                "  Monthly {:?}:       ${:>14.2}",
                result.status,
                result.monthly_gap.abs()
            );
            match result.lump_sum_longevity_years {
                Some(years) => println!("  Lump sum lasts:         {:>14.1} years", years),
                None => println!("  Lump sum lasts:         indefinitely"),
            }
        }

        Commands::Capacity {
            profile,
            rate,
            term,
            lvr,
            rental_yield,
            expense_ratio,
        } => {
            let profile = read_profile(profile)?;
            let tax = runner.tax_engine().calculate(&profile);
            let cashflow = MonthlySurplus::from_profile(&profile, &tax);
            let request = CapacityRequest {
                interest_rate: *rate,
                term_years: *term,
                max_lvr: *lvr,
                rental_yield: *rental_yield,
                property_expense_ratio: *expense_ratio,
                ..CapacityRequest::from_surplus(&cashflow)
            };
            let result = runner.serviceability_engine().max_serviceable_loan(&request);
            if cli.json {
                return print_json(&result);
            }
            println!("Borrowing capacity: {}", display_name(&profile));
            println!("  Monthly surplus:       ${:>14.2}", cashflow.surplus);
            if let Some(reason) = &result.reason {
                println!("  Not viable: {}", reason);
            } else {
                println!("  Available for loan:    ${:>14.2}", result.available_surplus);
                println!("  Rental contribution:   ${:>14.2}", result.rental_contribution);
                println!("  Maximum loan:          ${:>14.2}", result.max_loan);
                println!("  Maximum property:      ${:>14.2}", result.max_property_value);
            }
        }

        Commands::Assess {
            profile,
            amount,
            rate,
            term,
        } => {
            let profile = read_profile(profile)?;
            let loan = ProposedLoan::new(*amount, *rate, *term);
            let result = runner
                .serviceability_engine()
                .assess_proposed_loan(&profile, &loan);
            if cli.json {
                return print_json(&result);
            }
            println!(
                "Loan assessment: {} for ${:.0} at {:.2}% over {} years",
                display_name(&profile),
                amount,
                rate,
                term
            );
            println!("  Net monthly income:    ${:>12.2}", result.net_monthly_income);
            println!("  Existing commitments:  ${:>12.2}", result.existing_commitments);
            println!("  New repayment:         ${:>12.2}", result.new_payment);
            if let Some(ratio) = result.serviceability_ratio {
                println!("  Serviceability ratio:   {:>12.1}%", ratio);
            }
            println!(
                "  Stress test at {:.2}%:  ${:>12.2} ({})",
                result.stress_test.stressed_rate,
                result.stress_test.stressed_payment,
                if result.stress_test.passed { "pass" } else { "fail" }
            );
            println!("  Decision: {:?}", result.assessment);
            for reason in &result.reasons {
                println!("    - {}", reason);
            }
        }

        Commands::Batch { households, output } => {
            let profiles = load_households(households)
                .with_context(|| format!("loading households from {}", households.display()))?;
            let results = runner.run_batch(&profiles);
            if cli.json {
                return print_json(&results);
            }
            write_summaries(&results, output.as_deref())?;
            if let Some(path) = output {
                println!("Wrote {} summaries to {}", results.len(), path.display());
            }
        }
    }

    Ok(())
}

fn build_runner(cli: &Cli) -> Result<PlanRunner> {
    let schedules = match &cli.schedules {
        Some(dir) => Schedules::from_csv_path(dir)
            .with_context(|| format!("loading schedules from {}", dir.display()))?,
        None => Schedules::australia_2024_25(),
    };
    let assumptions = match &cli.assumptions {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening assumptions {}", path.display()))?;
            serde_json::from_reader::<_, AssumptionSet>(file)
                .with_context(|| format!("parsing assumptions {}", path.display()))?
        }
        None => AssumptionSet::standard(),
    };
    Ok(PlanRunner::with_schedules(schedules, assumptions))
}

fn read_profile(path: &Path) -> Result<FinancialProfile> {
    load_profile(path).with_context(|| format!("loading profile {}", path.display()))
}

fn display_name(profile: &FinancialProfile) -> &str {
    if profile.name.is_empty() {
        "(unnamed)"
    } else {
        &profile.name
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_summaries(results: &[PlanResult], output: Option<&Path>) -> Result<()> {
    let sink: Box<dyn std::io::Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);
    for result in results {
        writer.serialize(result.summary())?;
    }
    writer.flush()?;
    Ok(())
}
