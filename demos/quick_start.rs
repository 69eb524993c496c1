/// quick start - issue contracts, bill premiums, and settle a claim
use insurance_contracts_rs::{
    InsuranceCompany, Money, PaymentFrequency, Person, SafeTimeProvider, TimeSource, Vehicle,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start example ===\n");

    // controlled time so the billing is deterministic
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut company = InsuranceCompany::new();

    // a corporate policy holder and two natural persons
    company.register_person(Person::new("12345678")?)?;
    company.register_person(Person::new("7201011235")?)?;
    company.register_person(Person::new("1001011231")?)?;

    // insure a vehicle worth 10000: coverage is half the value and the
    // premium must reach 2 percent of it per year
    company.insure_vehicle(
        "v-2024-001",
        None,
        "12345678",
        Money::new(100),
        PaymentFrequency::Quarterly,
        Vehicle::new("BA111PZ", Money::new(10_000))?,
        &time,
    )?;
    println!("vehicle contract issued on {}", time.now().format("%Y-%m-%d"));

    // the first quarter is charged at issuance
    let data = company.contract("v-2024-001").unwrap().payment_data().unwrap();
    println!("outstanding after issuance: {}", data.outstanding_balance());

    // a travel contract for the two natural persons
    company.insure_persons(
        "t-2024-001",
        "7201011235",
        Money::new(10),
        PaymentFrequency::Annual,
        &["7201011235", "1001011231"],
        &time,
    )?;
    println!("travel contract issued, coverage {}", company.contract("t-2024-001").unwrap().coverage());

    // half a year later, two quarterly cycles have passed
    controller.advance(Duration::days(182));
    company.charge_premiums(&time);
    let data = company.contract("v-2024-001").unwrap().payment_data().unwrap();
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    println!("outstanding after sweep: {}", data.outstanding_balance());

    // pay the arrears off
    company.pay("v-2024-001", Money::new(300), &time)?;
    let data = company.contract("v-2024-001").unwrap().payment_data().unwrap();
    println!("outstanding after payment: {}", data.outstanding_balance());

    // a travel incident affecting both insured persons splits the coverage
    company.process_travel_claim("t-2024-001", &["7201011235", "1001011231"])?;
    let paid = company.person("7201011235").unwrap().paid_out_amount();
    println!("\ntravel claim settled, each person received {}", paid);
    println!(
        "travel contract active: {}",
        company.contract("t-2024-001").unwrap().is_active()
    );

    Ok(())
}
