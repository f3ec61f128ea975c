use crate::infra::InMemoryLendingStore;
use clap::Args;
use credit_engine::error::AppError;
use credit_engine::lending::{
    estimate_credit_score, CreditService, CreditServiceError, CsvSeedImporter, CustomerId,
    ImportSummary, LendingStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Customer CSV export
    #[arg(long)]
    pub(crate) customers: PathBuf,
    /// Optional loan CSV export providing repayment history
    #[arg(long)]
    pub(crate) loans: Option<PathBuf>,
    /// Customer to evaluate
    #[arg(long)]
    pub(crate) customer_id: u64,
    /// Requested principal
    #[arg(long)]
    pub(crate) amount: f64,
    /// Requested term in months
    #[arg(long)]
    pub(crate) tenure: u32,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Customer CSV export
    #[arg(long)]
    pub(crate) customers: PathBuf,
    /// Optional loan CSV export
    #[arg(long)]
    pub(crate) loans: Option<PathBuf>,
}

fn seeded_service(
    customers: PathBuf,
    loans: Option<PathBuf>,
) -> Result<(CreditService<InMemoryLendingStore>, ImportSummary), AppError> {
    let store = Arc::new(InMemoryLendingStore::default());
    let service = CreditService::new(store);
    let summary = CsvSeedImporter::new(service.store().as_ref(), service.policy())
        .from_paths(customers, loans)?;
    Ok((service, summary))
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let (_, summary) = seeded_service(args.customers, args.loans)?;
    println!("Seed import summary");
    print_summary(&summary);
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs {
        customers,
        loans,
        customer_id,
        amount,
        tenure,
    } = args;

    let (service, summary) = seeded_service(customers, loans)?;
    print_summary(&summary);

    let customer_id = CustomerId(customer_id);
    let customer = service.get_customer(customer_id)?;
    let history = service
        .store()
        .loans(customer_id, None)
        .map_err(CreditServiceError::from)?;
    let breakdown = estimate_credit_score(customer.monthly_income, &history);

    println!(
        "\nCustomer {} ({}) | income {:.2} | approved limit {:.2}",
        customer.customer_id,
        customer.full_name(),
        customer.monthly_income,
        customer.approved_limit
    );
    println!("Credit score {} from {} loans", breakdown.score, history.len());
    for component in &breakdown.components {
        println!(
            "  - {:?}: {:+} ({})",
            component.factor, component.points, component.notes
        );
    }

    let verdict = service.check_eligibility(customer_id, amount, tenure)?;
    println!(
        "\nRequest {:.2} over {} months -> {}",
        amount,
        tenure,
        if verdict.approval {
            "approved"
        } else {
            "rejected"
        }
    );
    println!(
        "Approval probability {}% | rate {:.2}% | installment {:.2}",
        verdict.approval_probability, verdict.interest_rate, verdict.monthly_payment
    );

    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!(
        "- {} customers ({} skipped) | {} loans imported | {} loans skipped",
        summary.customers, summary.skipped_customers, summary.loans, summary.skipped_loans
    );
}
