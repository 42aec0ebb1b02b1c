// Demo Orchestrator - walks the full flight-delay insurance flow end to end:
// airline funding, flight registration, insurance purchase, oracle consensus
// on a delayed flight, passenger credit and withdrawal.

use oracle_simulator::{spawn, OracleSimulator, SimulatorConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use surety_core::{Config, FlightKey, FlightStatus, PrincipalId, Surety};
use tokio::time::{sleep, timeout, Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoScenario {
    pub name: String,
    pub description: String,
    pub flight_code: String,
    pub departs_at: i64,
    pub passengers: Vec<DemoPassenger>,
    pub delay_status: FlightStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoPassenger {
    pub name: String,
    pub premium: Decimal,
}

fn delayed_flight_scenario() -> DemoScenario {
    DemoScenario {
        name: "ND1309 Late Departure".to_string(),
        description: "Three insured passengers on a flight the oracles report as delayed \
                      due to the airline"
            .to_string(),
        flight_code: "ND1309".to_string(),
        departs_at: 1_766_000_000,
        passengers: vec![
            DemoPassenger {
                name: "priya-sharma".to_string(),
                premium: dec!(1),
            },
            DemoPassenger {
                name: "rajesh-kumar".to_string(),
                premium: dec!(0.5),
            },
            DemoPassenger {
                name: "sunita-patel".to_string(),
                premium: dec!(0.25),
            },
        ],
        delay_status: FlightStatus::LateAirline,
    }
}

pub struct DemoOrchestrator {
    surety: Surety,
}

impl DemoOrchestrator {
    pub fn new() -> Self {
        let config = Config {
            rng_seed: Some(20_260_830),
            ..Config::default()
        };
        Self {
            surety: Surety::open(config),
        }
    }

    pub async fn run_demo(&self) -> surety_core::Result<()> {
        println!("\n🚀 =================================================================");
        println!("🚀 FlightSurety Ledger - End-to-End Demo");
        println!("🚀 Demonstrating: Escrowed Insurance with Oracle Consensus");
        println!("🚀 =================================================================\n");

        let scenario = delayed_flight_scenario();

        println!("📊 Demo Scenario: {}", scenario.name);
        println!("📊 {}", scenario.description);
        println!("📊 Passengers: {}", scenario.passengers.len());
        println!();

        let founder = self.surety.config().founding_airline.clone();
        let multiplier = self.surety.config().escrow.payout_multiplier;

        // Step 1: founding airline funds in and becomes a participant
        self.surety.fund_airline(founder.clone(), dec!(10)).await?;
        println!("  ✅ Airline {} funded (10) and promoted to participant 💰", founder);

        // Step 2: flight registered at Unknown status
        let flight = FlightKey::new(founder.clone(), &scenario.flight_code, scenario.departs_at);
        self.surety.register_flight(founder.clone(), flight.clone()).await?;
        println!("  ✅ Flight {} registered (status: Unknown)", flight);

        // Step 3: passengers buy insurance
        for passenger in &scenario.passengers {
            let id = PrincipalId::new(&passenger.name);
            self.surety
                .buy_insurance(id, flight.clone(), passenger.premium)
                .await?;
            println!(
                "  ✅ {} insured for {} (payout if delayed: {})",
                passenger.name,
                passenger.premium,
                passenger.premium * multiplier
            );
        }
        sleep(Duration::from_millis(200)).await;

        // Step 4: oracle fleet comes online and subscribes to the event bus
        let sim_config = SimulatorConfig {
            oracle_count: 20,
            fixed_status: Some(scenario.delay_status),
            rng_seed: Some(42),
            ..SimulatorConfig::default()
        };
        let simulator = OracleSimulator::register_fleet(&self.surety, sim_config)
            .await
            .map_err(|e| match e {
                oracle_simulator::Error::Core(e) => e,
                other => surety_core::Error::Concurrency(other.to_string()),
            })?;
        spawn(simulator, self.surety.subscribe());
        println!("\n  ✅ 20 oracles registered and watching for status requests");

        // Step 5: request the flight status; the fleet answers until quorum
        let status = self.resolve_flight(&flight).await?;
        println!("  ✅ Oracle consensus reached: flight resolved to {}", status);

        // Step 6: passengers pull their credited payouts
        println!();
        for passenger in &scenario.passengers {
            let id = PrincipalId::new(&passenger.name);
            let owed = self.surety.payout_owed(&id);
            let paid = self.surety.withdraw(id).await?;
            println!("  🎉 {} withdrew {} (owed {})", passenger.name, paid, owed);
        }

        self.show_final_metrics();
        Ok(())
    }

    /// Re-request until a drawn index has enough responding oracles.
    async fn resolve_flight(&self, flight: &FlightKey) -> surety_core::Result<FlightStatus> {
        let resolved = timeout(Duration::from_secs(10), async {
            loop {
                let index = self.surety.request_flight_status(flight.clone()).await?;
                println!("  📡 Status requested for {} (index {})", flight, index);

                for _ in 0..50 {
                    sleep(Duration::from_millis(10)).await;
                    let status = self.surety.flight_status(flight)?;
                    if status != FlightStatus::Unknown {
                        return Ok::<_, surety_core::Error>(status);
                    }
                }
            }
        })
        .await
        .map_err(|_| surety_core::Error::Concurrency("flight never resolved".to_string()))??;

        Ok(resolved)
    }

    fn show_final_metrics(&self) {
        let snapshot = self.surety.status_snapshot();

        println!("\n📈 =================================================================");
        println!("📈 FINAL LEDGER STATE");
        println!("📈 =================================================================\n");

        println!("  ✅ Operational: {}", snapshot.operational);
        println!("  ✅ Airlines Registered: {}", snapshot.airlines_registered);
        println!("  ✅ Participants: {}", snapshot.participants);
        println!("  ✅ Flights: {}", snapshot.flights);
        println!("  ✅ Policies: {}", snapshot.policies);
        println!("  ✅ Oracles: {}", snapshot.oracles);
        println!("  ✅ Funds Held: {}", snapshot.held_funds);
        println!("  ✅ Outstanding Payouts: {}", snapshot.outstanding_payouts);
        println!(
            "  ✅ Escrow Solvent: {}",
            if self.surety.check_escrow_solvency() { "Verified ✓" } else { "VIOLATED" }
        );
        println!();

        println!("🎉 Demo Complete!\n");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!("🏁 Starting FlightSurety Demo Orchestrator...\n");

    let orchestrator = DemoOrchestrator::new();
    orchestrator.run_demo().await?;
    Ok(())
}
