use cml_crt_sessions::configuration::Args;
use cml_crt_sessions::controller_api::HttpsTransport;
use cml_crt_sessions::external_client::ProcessLauncher;
use cml_crt_sessions::operator::{report_fatal, Operator, TerminalOperator};
use cml_crt_sessions::platform::Platform;
use cml_crt_sessions::provisioning::{Provisioner, ProvisioningContext, RunOutcome};
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::from_args();

    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
          CML lab console sessions for SecureCRT v{}
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    let operator = TerminalOperator::new();

    let platform = Platform::detect().unwrap_or_else(|e| fail(&operator, &e));

    let ctx = ProvisioningContext::resolve(&args, &platform).unwrap_or_else(|e| fail(&operator, &e));

    let transport =
        HttpsTransport::new(ctx.request_timeout).unwrap_or_else(|e| fail(&operator, &e));

    let outcome = Provisioner::new(&ctx, &transport, &ProcessLauncher, &operator)
        .run()
        .await;

    match outcome {
        Ok(RunOutcome::Generated(report)) => {
            info!(
                "{} session files written to {}",
                report.created,
                report.lab_dir.display()
            );
        }
        Ok(RunOutcome::Quit) => {
            info!("Exiting");
            std::process::exit(1);
        }
        Err(e) if !e.is_fatal() => {
            info!("Interrupted, exiting");
            std::process::exit(1);
        }
        Err(e) => fail(&operator, &e),
    }
}

/// Reports a fatal error, waits for the operator, and exits.
fn fail(operator: &dyn Operator, err: &dyn std::fmt::Display) -> ! {
    report_fatal(operator, err);
    std::process::exit(1);
}
