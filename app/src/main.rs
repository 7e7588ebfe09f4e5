mod preset;

use std::path::PathBuf;

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{ColorImage, TextureHandle};
use terrain_core::preview::{heights_to_image, standard_palette, to_rgb_bytes, weights_to_image};
use terrain_core::{
    GenerationParameters, HeightSource, MaterialClassifier, MemorySurface, ParameterRandomizer,
    Regenerator, Sampling, TerrainSurface,
};

const LAYERS: usize = 3;

struct TerrainApp {
    // parameters, watched every frame
    params: GenerationParameters,
    // slider is for n; heightmap size = 2^n + 1
    heightmap_exp: u32,
    alphamap_size: usize,
    sampling: Sampling,
    randomize: bool,

    surface: MemorySurface,
    regen: Regenerator,

    // generated textures
    height_texture: Option<TextureHandle>,
    splat_texture: Option<TextureHandle>,

    status_message: String,
}

impl TerrainApp {
    fn new(params: GenerationParameters) -> Self {
        let heightmap_exp = 7; // 2^7 + 1 = 129
        let alphamap_size = 128;
        Self {
            params,
            heightmap_exp,
            alphamap_size,
            sampling: Sampling::Nearest,
            randomize: false,
            surface: Self::build_surface(heightmap_exp, alphamap_size),
            regen: Regenerator::default(),
            height_texture: None,
            splat_texture: None,
            status_message: String::new(),
        }
    }

    fn build_surface(heightmap_exp: u32, alphamap_size: usize) -> MemorySurface {
        let size = (1 << heightmap_exp) + 1;
        MemorySurface::new((size, size), (alphamap_size, alphamap_size), LAYERS)
    }

    // Swap in a fresh regenerator; the next frame regenerates
    fn rebuild_regenerator(&mut self) {
        let classifier = MaterialClassifier::default().with_sampling(self.sampling);
        let regen = Regenerator::new(classifier);
        self.regen = if self.randomize {
            regen.with_randomizer(ParameterRandomizer::default(), self.params.seed)
        } else {
            regen
        };
    }

    fn refresh_textures(&mut self, ctx: &egui::Context) {
        let heights = match self.surface.height_field() {
            Ok(h) => h,
            Err(e) => {
                self.status_message = format!("Surface error: {e}");
                return;
            }
        };
        let weights = match self.surface.weight_field() {
            Ok(w) => w,
            Err(e) => {
                self.status_message = format!("Surface error: {e}");
                return;
            }
        };

        let gray = heights_to_image(&heights);
        let gray_image = ColorImage::from_gray(
            [gray.width() as usize, gray.height() as usize],
            gray.as_raw(),
        );
        self.height_texture =
            Some(ctx.load_texture("heights", gray_image, egui::TextureOptions::NEAREST));

        let splat = weights_to_image(&weights, &standard_palette());
        let splat_image = ColorImage::from_rgb(
            [splat.width() as usize, splat.height() as usize],
            &to_rgb_bytes(&splat),
        );
        self.splat_texture =
            Some(ctx.load_texture("splat", splat_image, egui::TextureOptions::NEAREST));
    }

    fn save_pngs(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };
        let result = self.surface.height_field().and_then(|heights| {
            let weights = self.surface.weight_field()?;
            Ok((heights, weights))
        });
        let (heights, weights) = match result {
            Ok(fields) => fields,
            Err(e) => {
                self.status_message = format!("Surface error: {e}");
                return;
            }
        };

        let height_path = dir.join(format!("heights_{}.png", self.params.seed));
        let splat_path = dir.join(format!("splat_{}.png", self.params.seed));
        let saved = heights_to_image(&heights)
            .save(&height_path)
            .and_then(|_| weights_to_image(&weights, &standard_palette()).save(&splat_path));
        self.status_message = match saved {
            Ok(()) => format!("Saved {} and {}", height_path.display(), splat_path.display()),
            Err(e) => {
                log::error!("PNG export failed: {e}");
                format!("PNG error: {e}")
            }
        };
    }

    fn load_preset(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        match preset::load(&path) {
            Ok(params) => {
                self.params = params;
                self.status_message = format!("Loaded {}", path.display());
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = format!("Preset error: {e}");
            }
        }
    }

    fn save_preset(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("terrain.json")
            .save_file()
        else {
            return;
        };
        self.status_message = match preset::save(&path, &self.params) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Preset error: {e}"),
        };
    }
}

impl App for TerrainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let size = (1 << self.heightmap_exp) + 1;

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Terrain Generator");
            ui.separator();

            // Resolutions
            let prev_exp = self.heightmap_exp;
            let prev_alpha = self.alphamap_size;
            ui.label("Heightmap 2^n+1");
            ui.add(
                egui::Slider::new(&mut self.heightmap_exp, 5..=9)
                    .text(format!("{}×{}", size, size))
                    .step_by(1.0),
            );
            ui.label("Alphamap");
            ui.add(egui::Slider::new(&mut self.alphamap_size, 16..=512));
            if prev_exp != self.heightmap_exp || prev_alpha != self.alphamap_size {
                self.surface = Self::build_surface(self.heightmap_exp, self.alphamap_size);
                self.regen.invalidate();
                self.status_message = "Surface resized".into();
            }

            ui.separator();
            ui.label("Terrain size");
            ui.add(egui::Slider::new(&mut self.params.width, 1..=1000).text("width"));
            ui.add(egui::Slider::new(&mut self.params.height, 1..=1000).text("height"));
            ui.add(egui::Slider::new(&mut self.params.amplitude, 1.0..=200.0).text("amplitude"));

            ui.label("Noise");
            ui.add(egui::DragValue::new(&mut self.params.seed).speed(1.0).prefix("seed "));
            ui.add(egui::Slider::new(&mut self.params.frequency, 0.1..=40.0).text("frequency"));
            ui.add_enabled(
                !self.randomize,
                egui::Slider::new(&mut self.params.octaves, 1..=8).text("octaves"),
            );
            ui.add_enabled(
                !self.randomize,
                egui::Slider::new(&mut self.params.persistence, 0.05..=1.0).text("persistence"),
            );

            ui.label("Materials");
            ui.add(
                egui::Slider::new(&mut self.params.texture_scale, 0.1..=3.0).text("texture scale"),
            );
            let prev_sampling = self.sampling;
            egui::ComboBox::from_label("Sampling")
                .selected_text(format!("{:?}", self.sampling))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.sampling, Sampling::Nearest, "Nearest");
                    ui.selectable_value(&mut self.sampling, Sampling::Bilinear, "Bilinear");
                });
            let prev_randomize = self.randomize;
            ui.checkbox(&mut self.randomize, "Randomize octaves & persistence");
            if prev_sampling != self.sampling || prev_randomize != self.randomize {
                self.rebuild_regenerator();
            }

            ui.separator();
            if ui.button("Regenerate").clicked() {
                self.regen.invalidate();
            }
            if ui.button("Save PNGs…").clicked() {
                self.save_pngs();
            }
            ui.horizontal(|ui| {
                if ui.button("Load preset…").clicked() {
                    self.load_preset();
                }
                if ui.button("Save preset…").clicked() {
                    self.save_preset();
                }
            });

            ui.separator();
            ui.label(&self.status_message);
        });

        // Regenerate when anything above changed since the last frame
        match self
            .regen
            .regenerate_if_changed(&mut self.surface, &self.params)
        {
            Ok(Some(report)) => {
                let ms = (report.heightfield_time + report.classify_time).as_secs_f32() * 1000.0;
                self.status_message = format!(
                    "Generated in {:.2} ms ({} octaves, persistence {:.2})",
                    ms, report.effective.octaves, report.effective.persistence
                );
                self.refresh_textures(ctx);
            }
            Ok(None) => {}
            Err(e) => {
                self.status_message = format!("Generation error: {e}");
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.height_texture, &self.splat_texture) {
                (Some(heights), Some(splat)) => {
                    let available = ui.available_size();
                    let side = (available.x / 2.0).min(available.y) - 8.0;
                    ui.horizontal(|ui| {
                        ui.image((heights.id(), egui::vec2(side, side)));
                        ui.image((splat.id(), egui::vec2(side, side)));
                    });
                    ui.label(format!(
                        "{}×{} heights, {}×{}×{} material map",
                        self.surface.heightmap_width(),
                        self.surface.heightmap_height(),
                        self.surface.alphamap_width(),
                        self.surface.alphamap_height(),
                        self.surface.alphamap_layers()
                    ));
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.label("Adjust parameters to generate terrain");
                    });
                }
            }
        });
    }
}

// `--preset <path>` loads starting parameters from JSON
fn preset_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--preset" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = match preset_arg() {
        Some(path) => match preset::load(&path) {
            Ok(params) => params,
            Err(e) => {
                log::error!("{e}, using defaults");
                GenerationParameters::default()
            }
        },
        None => GenerationParameters::default(),
    };

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([500.0, 300.0]),
        ..Default::default()
    };
    run_native(
        "Perlin Terrain Generator",
        opts,
        Box::new(|_cc| Ok(Box::new(TerrainApp::new(params)))),
    )
}
