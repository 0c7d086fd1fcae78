//! `caselink list` and `caselink alerts`: read-only views of a case.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use caselink_core::config::EffectiveConfig;
use caselink_core::db::{self, SqliteStore};
use caselink_core::model::PersistableAttachment;
use caselink_core::store::AttachedAlertIndex;
use caselink_core::ErrorCode;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case to list attachments for.
    pub case_id: String,
}

#[derive(Args, Debug)]
pub struct AlertsArgs {
    /// Case to show attached alert ids for.
    pub case_id: String,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    case_id: String,
    attachments: Vec<PersistableAttachment>,
}

#[derive(Debug, Serialize)]
struct AlertsOutput {
    case_id: String,
    alert_ids: Vec<String>,
}

fn open_existing(output: OutputMode, config: &EffectiveConfig) -> anyhow::Result<SqliteStore> {
    if let Some(store) = db::try_open_store(&config.store_path)? {
        return Ok(store);
    }
    let code = ErrorCode::NotInitialized;
    render_error(
        output,
        &CliError::from_code(
            format!("{}: {}", code.message(), config.store_path.display()),
            code,
        ),
    )?;
    anyhow::bail!("attachment store not found at {}", config.store_path.display());
}

fn render_list_text(out: &ListOutput, w: &mut dyn Write) -> io::Result<()> {
    for record in &out.attachments {
        writeln!(
            w,
            "{} {} {} {}",
            record.id,
            record.kind(),
            record.attributes.created_by.username,
            record.alert_ids().join(",")
        )?;
    }
    Ok(())
}

fn render_list_pretty(out: &ListOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Attachments on {} ({})", out.case_id, out.attachments.len()))?;
    for record in &out.attachments {
        writeln!(w)?;
        pretty_kv(w, "id", &record.id)?;
        pretty_kv(w, "kind", record.kind().as_str())?;
        pretty_kv(w, "owner", &record.attributes.owner)?;
        pretty_kv(w, "created", record.attributes.created_at.to_rfc3339())?;
        pretty_kv(w, "by", &record.attributes.created_by.username)?;
        if !record.alert_ids().is_empty() {
            pretty_kv(w, "alerts", record.alert_ids().join(", "))?;
        }
    }
    Ok(())
}

pub fn run_list(
    args: &ListArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let store = open_existing(output, config)?;
    let attachments = match store.list_for_case(&args.case_id) {
        Ok(attachments) => attachments,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(err.to_string(), ErrorCode::InternalUnexpected),
            )?;
            anyhow::bail!("{err}");
        }
    };

    let out = ListOutput {
        case_id: args.case_id.clone(),
        attachments,
    };
    render_mode(output, &out, render_list_text, render_list_pretty)
}

pub fn run_alerts(
    args: &AlertsArgs,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let store = open_existing(output, config)?;
    let attached = match store.get_all_alert_ids(&args.case_id) {
        Ok(attached) => attached,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(err.to_string(), ErrorCode::FetchAttachedIdsFailed),
            )?;
            anyhow::bail!("{err}");
        }
    };

    let out = AlertsOutput {
        case_id: args.case_id.clone(),
        alert_ids: attached.sorted().into_iter().map(str::to_string).collect(),
    };
    render_mode(
        output,
        &out,
        |out, w| {
            for id in &out.alert_ids {
                writeln!(w, "{id}")?;
            }
            Ok(())
        },
        |out, w| {
            pretty_section(w, &format!("Alerts on {} ({})", out.case_id, out.alert_ids.len()))?;
            for id in &out.alert_ids {
                writeln!(w, "  {id}")?;
            }
            Ok(())
        },
    )
}
