//! Handler for `realmkit provision`.

use std::sync::Arc;

use super::ProvisionArgs;
use crate::admin::{ClientOutcome, PasswordGrant, Provisioner, ProvisionReport, RealmOutcome};
use crate::config::{self, AdminCredentials, Endpoints, ProvisionPlan, UserFailurePolicy};
use crate::error::Result;

/// Handle `realmkit provision`.
pub async fn handle_provision(args: &ProvisionArgs) -> Result<()> {
    let credentials = AdminCredentials::from_env()?;
    let path = args.plan.clone().unwrap_or_else(config::default_plan_path);
    let mut plan = ProvisionPlan::load(&path)?;
    if args.fail_on_user_error {
        plan.policy.user_failures = UserFailurePolicy::Fail;
    }
    plan.policy.insecure_dev_mode |= args.insecure_dev_mode;
    tracing::info!(plan = %path.display(), realm = %plan.realm.realm, users = plan.users.len(), "provisioning");

    let provisioner = Provisioner::new(
        Endpoints::new(&credentials.base_url, &plan.realm.realm),
        Arc::new(PasswordGrant::new(&credentials)),
    )
    .with_policy(plan.policy);
    let report = provisioner.run(&plan).await?;
    print_report(&plan, &report);
    report.enforce(plan.policy.user_failures)?;
    Ok(())
}

fn print_report(plan: &ProvisionPlan, report: &ProvisionReport) {
    match report.realm {
        RealmOutcome::Created => println!("Realm '{}' created successfully!", plan.realm.realm),
        RealmOutcome::AlreadyExists => println!("Realm '{}' exists already!", plan.realm.realm),
    }
    let client_id = &plan.client.client_id;
    match &report.client {
        ClientOutcome::Created => println!("Client '{client_id}' created successfully!"),
        ClientOutcome::AlreadyExists { secret: Some(secret) } if plan.policy.insecure_dev_mode => {
            println!("Client '{client_id}' exists already! - Client secret is - {secret}");
        }
        ClientOutcome::AlreadyExists { .. } => println!("Client '{client_id}' exists already!"),
    }
    for user in &report.users {
        println!("{user}");
    }
    println!(
        "{} of {} users created",
        report.created_users(),
        report.users.len()
    );
}
