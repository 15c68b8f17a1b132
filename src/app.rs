use eframe::egui;

use crate::config::KioskConfig;
use crate::ui::{AppKind, PaintView, PhotosView, TextureCache, TypingView, launcher};

/// Textures kept alive across frames before LRU pruning kicks in
const TEXTURE_BUDGET: usize = 64;

/// The foreground mini-app; only one exists at a time
enum ActiveApp {
    Launcher,
    Paint(Box<PaintView>),
    Photos(Box<PhotosView>),
    Typing(Box<TypingView>),
}

pub struct KioskApp {
    config: KioskConfig,
    active: ActiveApp,
    textures: TextureCache,
}

impl KioskApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: KioskConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            config,
            active: ActiveApp::Launcher,
            textures: TextureCache::new(TEXTURE_BUDGET),
        }
    }

    fn start(&mut self, kind: AppKind, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        self.textures.clear();
        self.active = match kind {
            AppKind::Paint => ActiveApp::Paint(Box::new(PaintView::new(&self.config, screen))),
            AppKind::Photos => ActiveApp::Photos(Box::new(PhotosView::new(&self.config))),
            AppKind::Typing => ActiveApp::Typing(Box::new(TypingView::new(&self.config, screen))),
        };
    }

    fn go_home(&mut self) {
        if let ActiveApp::Paint(view) = &self.active {
            view.close();
        }
        self.active = ActiveApp::Launcher;
        self.textures.clear();
        log::info!("Back to launcher");
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();

        let mut launch = None;
        let home = match &mut self.active {
            ActiveApp::Launcher => {
                launch = launcher(ctx);
                false
            }
            ActiveApp::Paint(view) => view.show(ctx, &mut self.textures),
            ActiveApp::Photos(view) => view.show(ctx, &mut self.textures),
            ActiveApp::Typing(view) => view.show(ctx),
        };
        if let Some(kind) = launch {
            self.start(kind, ctx);
        } else if home {
            self.go_home();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let ActiveApp::Paint(view) = &self.active {
            view.close();
        }
    }
}
