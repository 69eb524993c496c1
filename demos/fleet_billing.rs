/// fleet billing - master contracts, pooled payments, and total loss
use insurance_contracts_rs::{
    InsuranceCompany, Money, PaymentFrequency, Person, SafeTimeProvider, TimeSource, Vehicle,
};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== fleet billing example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let mut company = InsuranceCompany::new();
    company.register_person(Person::new("12345678")?)?;

    // a master contract needs a corporate policy holder
    company.create_master_contract("fleet-01", None, "12345678", &time)?;

    // three vehicles insured separately, then moved under the master
    for (number, plate, value, premium) in [
        ("van-1", "BA100XA", 8_000, 50),
        ("van-2", "BA200XB", 8_000, 50),
        ("van-3", "BA300XC", 12_000, 80),
    ] {
        company.insure_vehicle(
            number,
            None,
            "12345678",
            Money::new(premium),
            PaymentFrequency::Monthly,
            Vehicle::new(plate, Money::new(value))?,
            &time,
        )?;
        company.move_single_to_master("fleet-01", number)?;
    }
    let fleet = company.contract("fleet-01").unwrap().as_master().unwrap();
    println!("fleet holds {} vehicles", fleet.children().len());

    // two months of premiums fall due on every vehicle
    controller.advance(Duration::days(60));
    company.charge_premiums(&time);
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    let fleet = company.contract("fleet-01").unwrap().as_master().unwrap();
    for child in fleet.children() {
        println!(
            "  {}: outstanding {}",
            child.number(),
            child.payment_data().unwrap().outstanding_balance()
        );
    }

    // one pooled payment settles the fleet arrears in insertion order
    company.pay("fleet-01", Money::new(500), &time)?;
    println!("\npaid 500 against the master contract");
    let fleet = company.contract("fleet-01").unwrap().as_master().unwrap();
    for child in fleet.children() {
        println!(
            "  {}: outstanding {}",
            child.number(),
            child.payment_data().unwrap().outstanding_balance()
        );
    }
    println!(
        "ledger entries on the master: {}",
        company.payment_history("fleet-01").unwrap().len()
    );

    // a crash writes van-3 off; damage above 70 percent of value is total loss
    company.process_vehicle_claim("van-3", Money::new(9_000))?;
    println!(
        "\nvan-3 written off, holder paid out {}",
        company.person("12345678").unwrap().paid_out_amount()
    );
    let fleet = company.contract("fleet-01").unwrap().as_master().unwrap();
    println!(
        "fleet still active through the remaining vans: {}",
        fleet.is_active()
    );

    // the whole company state serializes for storage
    let json = serde_json::to_string_pretty(&company)?;
    println!("\nserialized company state: {} bytes", json.len());

    Ok(())
}
