use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::info;

use crate::catalog::FormKind;
use crate::components::form::{FieldSpec, Form, FormMsg};
use crate::config::AppContext;
use crate::frame::{self, split_footer};
use crate::msg::Msg;
use crate::theme::ThemeTokens;
use crate::view::{Effect, Update, View};

/// How a field's value lands on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Positional,
    /// `--flag value`, omitted when the value is empty.
    Flag(&'static str),
    /// Whitespace-split and appended after `--`.
    Rest,
}

#[derive(Debug, Clone)]
pub struct FormLayout {
    pub title: &'static str,
    pub stem: &'static [&'static str],
    pub fields: Vec<(FieldSpec, Arg)>,
}

#[must_use]
pub fn layout(kind: FormKind) -> FormLayout {
    match kind {
        FormKind::AddServer => FormLayout {
            title: "Add MCP server",
            stem: &["mcp", "add"],
            fields: vec![
                (
                    FieldSpec::text("name", "Name").placeholder("e.g. filesystem").required(),
                    Arg::Positional,
                ),
                (
                    FieldSpec::text("command", "Command")
                        .placeholder("executable or path")
                        .required()
                        .path(),
                    Arg::Positional,
                ),
                (
                    FieldSpec::text("scope", "Scope").placeholder("local | project | user"),
                    Arg::Flag("--scope"),
                ),
                (
                    FieldSpec::text("args", "Arguments").placeholder("passed to the server"),
                    Arg::Rest,
                ),
            ],
        },
        FormKind::Attach => FormLayout {
            title: "Attach assets",
            stem: &["attach"],
            fields: vec![
                (
                    FieldSpec::text("target", "Target directory")
                        .placeholder("./my-project")
                        .required()
                        .path(),
                    Arg::Positional,
                ),
                (
                    FieldSpec::text("template", "Template").placeholder("default"),
                    Arg::Flag("--template"),
                ),
            ],
        },
        FormKind::Sandbox => FormLayout {
            title: "Sandbox",
            stem: &["sandbox", "create"],
            fields: vec![
                (
                    FieldSpec::text("name", "Name").placeholder("scratch").required(),
                    Arg::Positional,
                ),
                (
                    FieldSpec::text("dir", "Mount directory").placeholder("~/code/project").path(),
                    Arg::Flag("--mount"),
                ),
                (
                    FieldSpec::text("image", "Image").placeholder("default image"),
                    Arg::Flag("--image"),
                ),
            ],
        },
        FormKind::Upgrade => FormLayout {
            title: "Upgrade",
            stem: &["upgrade"],
            fields: vec![
                (
                    FieldSpec::text("version", "Version").placeholder("latest"),
                    Arg::Flag("--version"),
                ),
                (
                    FieldSpec::text("channel", "Channel").placeholder("stable | beta"),
                    Arg::Flag("--channel"),
                ),
            ],
        },
    }
}

impl FormLayout {
    /// Flatten submitted values into an argument list, in field order.
    #[must_use]
    pub fn command_args(&self, values: &[(String, String)]) -> Vec<String> {
        let mut args: Vec<String> = self.stem.iter().map(|s| (*s).to_string()).collect();
        let mut rest: Vec<String> = Vec::new();
        for ((_, arg), (_, value)) in self.fields.iter().zip(values) {
            if value.is_empty() {
                continue;
            }
            match arg {
                Arg::Positional => args.push(value.clone()),
                Arg::Flag(flag) => {
                    args.push((*flag).to_string());
                    args.push(value.clone());
                }
                Arg::Rest => rest.extend(value.split_whitespace().map(str::to_string)),
            }
        }
        if !rest.is_empty() {
            args.push("--".to_string());
            args.extend(rest);
        }
        args
    }
}

/// A catalogue form. Submitting pops it and runs the subcommand with the terminal attached.
pub struct FormScreen {
    ctx: Arc<AppContext>,
    layout: FormLayout,
    form: Form,
}

impl FormScreen {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>, kind: FormKind) -> Self {
        let layout = layout(kind);
        let specs = layout.fields.iter().map(|(s, _)| s.clone()).collect();
        let form = Form::new(specs).with_visible_suggestions(ctx.suggestions_visible);
        Self { ctx, layout, form }
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }
}

impl View for FormScreen {
    fn title(&self) -> String {
        self.layout.title.to_string()
    }

    fn fullscreen(&self) -> bool {
        false
    }

    fn update(&mut self, msg: Msg) -> Update {
        let out = self.form.update(msg);
        let update = Update::none().with_task(out.task);
        match out.outcome {
            None => update,
            Some(FormMsg::Cancel) => Update::pop(),
            Some(FormMsg::Submit(values)) => {
                let args = self.layout.command_args(&values);
                info!(form = self.layout.title, ?args, "form submitted");
                let spec = self.ctx.backend.command(self.layout.title, args);
                Update::pop().with_effect(Effect::RunAndResume(spec))
            }
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let inner = frame::render_border_block(self.layout.title, area, f, theme);
        let (body, footer) = split_footer(inner);
        self.form.render(f, body, theme);
        let hint = Line::from(Span::styled(
            "tab next/accept · shift+tab back · enter submit · esc cancel   * required",
            theme.muted(),
        ));
        f.render_widget(Paragraph::new(hint), footer);
    }
}
