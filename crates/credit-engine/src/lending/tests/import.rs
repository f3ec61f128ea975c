use std::io::Cursor;

use super::common::*;
use crate::lending::domain::{CustomerId, LoanId, LoanStatus};
use crate::lending::import::{CsvSeedImporter, ImportError};
use crate::lending::policy::CreditPolicy;
use crate::lending::repository::LendingStore;

const CUSTOMERS: &str = "\
Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,9000,
2,Abigail,Stewart,29,9219167434,25000,900000
";

const LOANS: &str = "\
Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
1,7798,900000,138,16.93,15723,140,2017-01-11,2028-07-11
2,8001,200000,24,11.2,9320,20,2021-05-03,2023-05-03
2,8001,300000,36,12.5,10040,30,2021-06-01,2024-06-01
2,8002,150000,12,9.1,13120,12,not-a-date,2022-01-01
9,8003,50000,12,10.0,4400,12,2022-01-01,2023-01-01
";

#[test]
fn customers_without_limit_get_derived_one() {
    let store = MemoryStore::default();
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);

    let (imported, skipped) = importer
        .import_customers(Cursor::new(CUSTOMERS))
        .expect("customers import");

    assert_eq!(imported, 2);
    assert_eq!(skipped, 0);
    let derived = store.customer(CustomerId(1)).expect("store").expect("customer");
    assert_eq!(derived.approved_limit, 324_000.0);
    assert_eq!(derived.monthly_income, 9_000.0);
    let explicit = store.customer(CustomerId(2)).expect("store").expect("customer");
    assert_eq!(explicit.approved_limit, 900_000.0);
}

#[test]
fn loan_rows_that_cannot_be_placed_are_skipped() {
    let store = MemoryStore::default();
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);
    importer
        .import_customers(Cursor::new(CUSTOMERS))
        .expect("customers import");

    let (imported, skipped) = importer
        .import_loans(Cursor::new(LOANS))
        .expect("loans import");

    assert_eq!(imported, 2);
    assert_eq!(skipped, 3);
    assert_eq!(store.loan_count(), 2);

    let first = store.loan(LoanId(8001)).expect("store").expect("loan");
    assert_eq!(first.loan_amount, 200_000.0);
    assert_eq!(first.status, LoanStatus::Approved);
    assert_eq!(first.start_date, date(2021, 5, 3));

    let capped = store.loan(LoanId(7798)).expect("store").expect("loan");
    assert_eq!(capped.emis_paid_on_time, 138);
}

#[test]
fn repeated_customer_ids_abort_the_import() {
    let store = MemoryStore::default();
    store.seed_customer(customer(2, 10_000.0, 360_000.0));
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);

    let err = importer
        .import_customers(Cursor::new(CUSTOMERS))
        .expect_err("customer 2 already present");

    assert!(matches!(
        err,
        ImportError::Customer {
            customer_id: CustomerId(2),
            ..
        }
    ));
}

#[test]
fn malformed_rows_surface_csv_errors() {
    let store = MemoryStore::default();
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);
    let broken = "Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary\n\
                  x,Aaron,Garcia,63,9629317944,9000\n";

    let err = importer
        .import_customers(Cursor::new(broken))
        .expect_err("non-numeric id");

    assert!(matches!(err, ImportError::Csv(_)));
}

#[test]
fn customers_without_positive_salary_are_skipped_with_their_loans() {
    let store = MemoryStore::default();
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);
    let customers = "\
Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,9000,
3,Ivan,Petrov,41,9000000003,0,
4,Lena,Moreau,35,9000000004,-2500,
5,Omar,Haddad,0,9000000005,12000,
";
    let loans = "\
Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
1,9001,100000,12,10.0,8792,12,2022-01-01,2023-01-01
3,9002,100000,12,10.0,8792,12,2022-01-01,2023-01-01
";

    let (imported, skipped) = importer
        .import_customers(Cursor::new(customers))
        .expect("customers import");
    assert_eq!((imported, skipped), (1, 3));
    assert!(store.customer(CustomerId(3)).expect("store").is_none());

    let (imported, skipped) = importer
        .import_loans(Cursor::new(loans))
        .expect("loans import");
    assert_eq!((imported, skipped), (1, 1));
    assert!(store.loan(LoanId(9002)).expect("store").is_none());
}

#[test]
fn loans_with_zero_tenure_or_amount_are_skipped() {
    let store = MemoryStore::default();
    let policy = CreditPolicy::default();
    let importer = CsvSeedImporter::new(&store, &policy);
    importer
        .import_customers(Cursor::new(CUSTOMERS))
        .expect("customers import");
    let loans = "\
Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
2,9101,200000,0,11.2,9320,0,2021-05-03,2021-05-03
2,9102,0,24,11.2,0,0,2021-05-03,2023-05-03
2,9103,-5000,24,11.2,230,3,2021-05-03,2023-05-03
2,9104,200000,24,11.2,9320,20,2021-05-03,2023-05-03
";

    let (imported, skipped) = importer
        .import_loans(Cursor::new(loans))
        .expect("loans import");

    assert_eq!((imported, skipped), (1, 3));
    assert_eq!(store.loan_count(), 1);
    let kept = store.loan(LoanId(9104)).expect("store").expect("loan");
    assert_eq!(kept.tenure, 24);
}
