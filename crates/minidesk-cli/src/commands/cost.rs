use clap::Args;
use minidesk_core::cost::{format_amount, CostField, MONTH_PRESETS};
use minidesk_core::Config;

/// Amounts are taken as text; anything that is not a non-negative number
/// counts as 0.
#[derive(Args)]
pub struct CostArgs {
    #[arg(long)]
    deposit: Option<String>,
    #[arg(long)]
    monthly_rent: Option<String>,
    #[arg(long)]
    maintenance: Option<String>,
    #[arg(long)]
    utilities: Option<String>,
    #[arg(long)]
    groceries: Option<String>,
    #[arg(long)]
    transport: Option<String>,
    #[arg(long)]
    internet: Option<String>,
    #[arg(long)]
    other: Option<String>,
    #[arg(long)]
    setup_cost: Option<String>,
    /// Tenancy length, rounded and clamped to 1..=48
    #[arg(long, allow_negative_numbers = true)]
    months: Option<f64>,
    /// Monthly income
    #[arg(long)]
    income: Option<String>,
    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

impl CostArgs {
    fn overrides(&self) -> [(CostField, Option<&String>); 9] {
        [
            (CostField::Deposit, self.deposit.as_ref()),
            (CostField::MonthlyRent, self.monthly_rent.as_ref()),
            (CostField::Maintenance, self.maintenance.as_ref()),
            (CostField::Utilities, self.utilities.as_ref()),
            (CostField::Groceries, self.groceries.as_ref()),
            (CostField::Transport, self.transport.as_ref()),
            (CostField::Internet, self.internet.as_ref()),
            (CostField::Other, self.other.as_ref()),
            (CostField::SetupCost, self.setup_cost.as_ref()),
        ]
    }
}

pub fn run(args: CostArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut model = Config::load_or_default().cost_model();

    for (field, raw) in args.overrides() {
        if let Some(raw) = raw {
            model.set_field_str(field, raw);
        }
    }
    if let Some(months) = args.months {
        model.set_duration(months);
    }
    if let Some(income) = &args.income {
        model.set_income(minidesk_core::cost::parse_amount(income));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&model.snapshot())?);
        return Ok(());
    }

    let out = model.derive();
    let months = model.months();
    let preset = if MONTH_PRESETS.contains(&months) { " (preset)" } else { "" };

    println!("months             {months}{preset}");
    println!("monthly base       {}", format_amount(out.monthly_base));
    println!("amortized setup    {:.2}", out.amortized_setup);
    println!("total spent        {}", format_amount(out.total_spent));
    println!("initial cash need  {}", format_amount(out.initial_cash_need));
    println!(
        "monthly balance    {} {}",
        format_amount(out.monthly_delta.abs()),
        out.monthly_balance().label()
    );
    println!(
        "period balance     {} {}",
        format_amount(out.period_delta.abs()),
        out.period_balance().label()
    );
    Ok(())
}
