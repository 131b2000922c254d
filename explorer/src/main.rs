//! 探索視圖：選單、格網繪製與鍵盤輸入的薄殼，規則全部在 explore-lib
use explore_lib::{
    Direction, ExplorationSession, GenParams, MARKER_COLOR, MAX_MOVES_PER_TURN, Phase, Pos,
    terrain_color,
};

/** 單格像素大小 */
const TILE_SIZE: f32 = 7.0;

/// 方向鍵對應（方向鍵 + Home/PageUp/End/PageDown 斜向）
const KEY_DIRECTIONS: [(egui::Key, Direction); 8] = [
    (egui::Key::ArrowUp, Direction::North),
    (egui::Key::ArrowDown, Direction::South),
    (egui::Key::ArrowLeft, Direction::West),
    (egui::Key::ArrowRight, Direction::East),
    (egui::Key::Home, Direction::NorthWest),
    (egui::Key::PageUp, Direction::NorthEast),
    (egui::Key::End, Direction::SouthWest),
    (egui::Key::PageDown, Direction::SouthEast),
];

struct ExplorerApp {
    session: ExplorationSession,
    /// 首次開始後選單按鈕改顯示 Continue
    started: bool,
}

impl Default for ExplorerApp {
    fn default() -> Self {
        Self {
            session: ExplorationSession::with_params(load_params(), 1, 1),
            started: false,
        }
    }
}

/// 讀取工作目錄下的 params.toml，缺檔或解析失敗時用預設值
fn load_params() -> GenParams {
    match std::fs::read_to_string("params.toml") {
        Ok(text) => match toml::from_str(&text) {
            Ok(params) => params,
            Err(err) => {
                println!("無法解析 params.toml: {}", err);
                GenParams::default()
            }
        },
        Err(_) => GenParams::default(),
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.session.phase() {
            Phase::Menu => self.ui_menu(ctx),
            Phase::Playing => self.ui_playing(ctx),
        }
    }
}

impl ExplorerApp {
    fn ui_menu(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            // 視窗尺寸換算為格數；地圖一經產生即不再重生
            let avail = ui.available_size();
            let width = (avail.x / TILE_SIZE).floor().max(1.0) as usize;
            let height = (avail.y / TILE_SIZE).floor().max(1.0) as usize;
            self.session.on_resize(width, height);

            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading("Exploration");
                ui.add_space(20.0);

                let start_label = if self.started { "Continue" } else { "Start Game" };
                if ui.button(start_label).clicked() {
                    let mut rng = rand::rng();
                    match self.session.enter_playing(&mut rng) {
                        Ok(()) => {
                            self.started = true;
                            println!("遊戲階段: {}", self.session.phase());
                        }
                        Err(err) => println!("無法產生地圖: {}", err),
                    }
                }
                // 尚未實作的選單項目
                for label in ["Options", "Help", "Credits", "Load Game"] {
                    let _ = ui.add_enabled(false, egui::Button::new(label));
                }
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn ui_playing(&mut self, ctx: &egui::Context) {
        self.handle_input(ctx);

        egui::SidePanel::right("turn_panel").show(ctx, |ui| {
            let budget = self.session.budget();
            ui.heading("回合");
            ui.label(format!("剩餘點數: {}", budget.points_remaining));
            ui.label(format!(
                "本回合移動: {}/{}",
                budget.moves_this_turn, MAX_MOVES_PER_TURN
            ));
            ui.separator();
            if let Some(kind) = self
                .session
                .grid()
                .and_then(|grid| grid.get_tile(self.session.marker()))
            {
                ui.label(format!("目前地形: {}", kind));
            }
            ui.separator();
            ui.label("Esc 回選單");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_map_display(ui);
        });

        // 每秒重繪一次驅動標記閃爍
        ctx.request_repaint_after(std::time::Duration::from_secs(1));
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.session.leave_playing();
            println!("遊戲階段: {}", self.session.phase());
            return;
        }
        for (key, direction) in KEY_DIRECTIONS {
            if ctx.input(|i| i.key_pressed(key)) {
                let outcome = self.session.apply_move(direction);
                if outcome.accepted {
                    println!("剩餘點數: {}", self.session.budget().points_remaining);
                }
                if outcome.turn_ended {
                    println!("回合結束");
                }
            }
        }
    }

    fn ui_map_display(&self, ui: &mut egui::Ui) {
        let Some(grid) = self.session.grid() else {
            return;
        };
        let marker = self.session.marker();
        // 每秒切換的閃爍狀態，僅影響繪製
        let flash_visible = ui.input(|i| i.time) as u64 % 2 == 0;

        let mut pixels = Vec::with_capacity(grid.width() * grid.height() * 3);
        for (y, row) in grid.rows().enumerate() {
            for (x, &kind) in row.iter().enumerate() {
                let (r, g, b) = if flash_visible && marker == (Pos { x, y }) {
                    MARKER_COLOR
                } else {
                    terrain_color(kind)
                };
                pixels.extend_from_slice(&[r, g, b]);
            }
        }
        let image = egui::ColorImage::from_rgb([grid.width(), grid.height()], &pixels);
        let texture = ui
            .ctx()
            .load_texture("terrainmap", image, egui::TextureOptions::NEAREST);

        let img_size = [
            grid.width() as f32 * TILE_SIZE,
            grid.height() as f32 * TILE_SIZE,
        ];
        ui.add(egui::Image::new(&texture).fit_to_exact_size(img_size.into()));
    }
}

/** 主程式進入點 */
fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Exploration",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::default()))),
    )
}
