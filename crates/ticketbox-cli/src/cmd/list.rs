//! `tb list`: list tickets in natural or sorted order.

use crate::cmd::Context;
use crate::output::{OutputMode, Renderable, fail, pretty_rule, render_list};
use clap::Args;
use std::io::{self, Write};
use ticketbox_core::sort::{SortKey, SortSetting};
use ticketbox_core::view::{TicketRow, build_rows_with};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Sort by: uid, subject, text, created, modified, state, priority.
    #[arg(short, long, value_name = "KEY")]
    pub sort: Option<SortKey>,

    /// Reverse the sort order.
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl ListArgs {
    fn setting(&self) -> SortSetting {
        match self.sort {
            Some(key) => SortSetting::by(key, !self.desc),
            None => SortSetting::unsorted(),
        }
    }
}

/// One line of `tb list` output.
struct ListRow(TicketRow);

impl Renderable for ListRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let row = &self.0;
        writeln!(
            w,
            "{:<6}  {:1}  {:<11}  {:<19}  {}",
            row.uid(),
            if row.ticket.priority { "!" } else { "" },
            row.state_label,
            row.modified_text,
            row.ticket.subject
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, &self.0.ticket)?;
        Ok(())
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let row = &self.0;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            row.uid(),
            row.ticket.state.code(),
            u8::from(row.ticket.priority),
            row.ticket.modified,
            row.ticket.subject
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["UID", "STATE", "PRIORITY", "MODIFIED", "SUBJECT"]
    }
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let dispatcher = ctx.dispatcher();
    let tickets = dispatcher
        .repository()
        .load_all()
        .map_err(|err| fail(ctx.output, err))?;

    let setting = args.setting();
    let rows: Vec<ListRow> = build_rows_with(&tickets, &setting, &ctx.config.ui.date_format)
        .into_iter()
        .map(ListRow)
        .collect();

    if ctx.output == OutputMode::Pretty {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if rows.is_empty() {
            writeln!(out, "No tickets.")?;
            return Ok(());
        }
        writeln!(
            out,
            "{:<6}  {:1}  {:<11}  {:<19}  SUBJECT   (sort: {})",
            "UID",
            "!",
            "STATE",
            "MODIFIED",
            setting.label()
        )?;
        pretty_rule(&mut out)?;
    }

    render_list(&rows, ctx.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::write_list;
    use clap::Parser;
    use ticketbox_core::model::{State, Ticket, Tickets};

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    fn tickets() -> Tickets {
        [("k00001", "Banana", true), ("k00002", "Apple", false)]
            .into_iter()
            .map(|(uid, subject, priority)| {
                let t = Ticket {
                    uid: uid.into(),
                    subject: subject.into(),
                    text: String::new(),
                    created: 5,
                    modified: 7,
                    state: State::New,
                    priority,
                };
                (t.uid.clone(), t)
            })
            .collect()
    }

    fn rendered(setting: &SortSetting, mode: OutputMode) -> String {
        let rows: Vec<ListRow> = build_rows_with(&tickets(), setting, "%Y")
            .into_iter()
            .map(ListRow)
            .collect();
        let mut buf = Vec::new();
        write_list(&mut buf, &rows, mode).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn defaults_to_natural_order() {
        let w = Wrapper::parse_from(["test"]);
        assert_eq!(w.args.setting(), SortSetting::unsorted());
    }

    #[test]
    fn sort_and_desc_build_a_setting() {
        let w = Wrapper::parse_from(["test", "--sort", "subject", "--desc"]);
        assert_eq!(w.args.setting(), SortSetting::by(SortKey::Subject, false));
    }

    #[test]
    fn desc_requires_sort() {
        assert!(Wrapper::try_parse_from(["test", "--desc"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "--sort", "size"]).is_err());
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let out = rendered(&SortSetting::by(SortKey::Subject, true), OutputMode::Text);
        assert_eq!(
            out,
            "UID\tSTATE\tPRIORITY\tMODIFIED\tSUBJECT\n\
             k00002\tn\t0\t7\tApple\n\
             k00001\tn\t1\t7\tBanana\n"
        );
    }

    #[test]
    fn json_rows_use_the_persisted_shape() {
        let out = rendered(&SortSetting::unsorted(), OutputMode::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["uid"], "k00001");
        assert_eq!(parsed[0]["state"], "n");
        assert_eq!(parsed[1]["priority"], false);
    }
}
