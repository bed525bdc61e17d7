use anyhow::{bail, Context, Result};
use privy_cred::{
    integrity::Secp256k1Ecdsa, value_from_fields, CredentialPayload, Issuance, MemoryStore,
    ProtocolConfig, ProtocolParams, Role,
};
use tracing_subscriber::EnvFilter;

// Walks through the flow of an applicant obtaining a credential from an authority, and a third
// party checking it from the payload alone.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // A smaller modulus keeps key generation quick for the demo.
    let config = ProtocolConfig::from_json(r#"{ "modulus_bits": 1024 }"#)?;
    let params = ProtocolParams::new(&config)?;
    let mut rng = rand::thread_rng();

    let (applicant, authority) = Role::<Secp256k1Ecdsa>::provision(&config, &mut rng)?;
    let applicant = applicant.applicant().context("expected applicant keys")?;
    let authority = authority.authority().context("expected authority keys")?;

    let issuance = Issuance::<_>::new(&params, MemoryStore::new());

    // The applicant only reveals a commitment to a value derived from their details.
    let value = value_from_fields("Jane Doe", 2500);
    let (record, secrets) = issuance.submit(applicant, &value, &mut rng)?;
    println!("Submitted application {}", record.id());
    println!("Commitment: {}", record.commitment().to_hex());

    let report = issuance.status(&record.id(), &authority.intake)?;
    println!("Status: {:?}, valid: {}", report.status, report.valid);

    // The authority reviews the pending queue and approves.
    for pending in issuance.pending() {
        let decided = issuance.decide(authority, &pending.id(), true)?;
        println!("Decided {}: {:?}", decided.id(), decided.status());
    }

    let credential =
        issuance.issue_credential(&secrets.id, &secrets.blinding_factor, &applicant.blind)?;
    let payload = credential.payload(&applicant.blind).to_json();
    println!("Credential payload: {payload}");

    // A verifier holding only the payload and the published generators.
    let received = CredentialPayload::from_json(&payload)?;
    if received.key != *authority.blind.public_key() {
        bail!("credential signed by an unknown key");
    }
    if !received.verify(&params.generators) {
        bail!("credential failed to verify");
    }
    tracing::info!(id = %received.credential.app_id, "verifier accepted credential");

    Ok(())
}
