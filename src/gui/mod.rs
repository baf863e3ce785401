use crate::executor::{Executor, QueryResult};
use eframe::{App, egui};
use egui::Color32;
use egui_extras;
use egui_extras::syntax_highlighting::CodeTheme;
use tokio::runtime::Runtime;

pub struct Application {
    rt: Runtime,
    exe: Executor,
    query: String,
    result: Option<QueryResult>,
}

impl App for Application {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("schema").show(ctx, |ui| self.draw_schema(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            let max_rect = ui.max_rect();
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.set_width(max_rect.width() * 0.5);
                    self.draw_code_editor(max_rect.height() - 20., ui);
                    ui.button("Query!").clicked().then(|| {
                        // 한 줄에 쿼리 하나
                        let src = self.query.trim().trim_end_matches(';').to_string();
                        let result = self.rt.block_on(self.exe.run(&src));
                        self.result = Some(result);
                    });
                });
                ui.separator();
                ui.vertical(|ui| match &self.result {
                    None => {
                        ui.label("No results yet.");
                    }
                    Some(QueryResult::Rows(rows)) => {
                        ui.label(format!("{} row(s)", rows.len()));
                        egui::ScrollArea::both().show(ui, |ui| {
                            egui::Grid::new("rows").striped(true).show(ui, |ui| {
                                for row in rows {
                                    for cell in row {
                                        ui.monospace(cell);
                                    }
                                    ui.end_row();
                                }
                            });
                        });
                    }
                    Some(QueryResult::Inserted) => {
                        ui.colored_label(Color32::GREEN, "Row inserted successfully.");
                    }
                    Some(QueryResult::Deleted(count)) => {
                        ui.colored_label(Color32::GREEN, format!("{count} row(s) deleted."));
                    }
                    Some(QueryResult::Error(msg)) => {
                        ui.colored_label(Color32::RED, format!("Error: {}", msg));
                    }
                });
            });
        });
    }
}

impl Application {
    pub fn new(rt: Runtime, exe: Executor) -> Self {
        Self {
            rt,
            exe,
            query: String::new(),
            result: None,
        }
    }

    pub fn launch(self) -> eframe::Result {
        let options = eframe::NativeOptions::default();
        eframe::run_native("shardql", options, Box::new(|_cc| Ok(Box::new(self))))
    }

    fn draw_schema(&self, ui: &mut egui::Ui) {
        let schema = self.exe.schema();
        ui.heading(&schema.name);
        ui.label(format!("{} rows per shard", schema.tuples_limit));
        ui.small(self.exe.storage().root().display().to_string());
        ui.separator();
        for table in schema.structure.keys() {
            ui.collapsing(table, |ui| {
                ui.monospace(format!("{table}_pk"));
                for column in schema.columns(table).unwrap_or_default() {
                    ui.monospace(column);
                }
            });
        }
    }

    fn draw_code_editor(&mut self, height: f32, ui: &mut egui::Ui) {
        let mut layouter = |ui: &egui::Ui, buf: &dyn egui::TextBuffer, wrap_width: f32| {
            let mut layout_job = egui_extras::syntax_highlighting::highlight(
                ui.ctx(),
                ui.style(),
                &CodeTheme::dark(20.0),
                buf.as_str(),
                "SQL",
            );
            layout_job.wrap.max_width = wrap_width;
            ui.fonts_mut(|f| f.layout_job(layout_job))
        };
        egui::ScrollArea::vertical()
            .min_scrolled_height(height)
            .show(ui, |ui| {
                ui.take_available_height();
                let editor = egui::TextEdit::multiline(&mut self.query)
                    .font(egui::TextStyle::Monospace) // for cursor height
                    .code_editor()
                    .desired_rows(999)
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .layouter(&mut layouter);
                ui.add(editor);
            });
    }
}
