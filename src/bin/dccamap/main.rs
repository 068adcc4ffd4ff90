use std::{cell::RefCell, collections::BTreeSet, path::PathBuf, rc::Rc};

use anyhow::Context as _;
use clap::Parser as CliParser;
use dccamap::{
  DccaMap,
  color::ColorAssigner,
  config::Config,
  district::{AreaId, DistrictCode, Districts, NameTable},
  map::egui_host::EguiMapHost,
  parser::GeometryFormat,
};

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Boundary geometry file. Defaults to the configured one.
  #[arg(short, long)]
  geometry: Option<PathBuf>,

  /// Format of the geometry file.
  #[arg(short, long, value_enum)]
  format: Option<GeometryFormat>,

  /// JSON file with the localized names of the districts.
  #[arg(short, long)]
  districts: Option<PathBuf>,

  /// JSON file with the localized names of the areas.
  #[arg(short, long)]
  areas: Option<PathBuf>,

  /// Name locale, e.g. T, S or E.
  #[arg(short, long)]
  locale: Option<String>,
}

impl Args {
  /// Command line values win over the configuration.
  fn into_config(self) -> Config {
    Config {
      geometry_path: self.geometry,
      geometry_format: self.format,
      district_names_path: self.districts,
      area_names_path: self.areas,
      locale: self.locale,
      ..Config::default()
    }
    .merge(&Config::new())
  }
}

struct DccaApp {
  map: DccaMap<EguiMapHost>,
  labels: Vec<(DistrictCode, String)>,
  checked: BTreeSet<DistrictCode>,
  active_area: Rc<RefCell<Option<AreaId>>>,
}

impl DccaApp {
  fn district_filter(&mut self, ui: &mut egui::Ui) {
    let mut changed = false;
    ui.horizontal(|ui| {
      if ui.button("All").clicked() {
        self.checked = self.labels.iter().map(|(code, _)| code.clone()).collect();
        changed = true;
      }
      if ui.button("None").clicked() {
        self.checked.clear();
        changed = true;
      }
    });
    ui.separator();
    egui::ScrollArea::vertical().show(ui, |ui| {
      for (code, label) in &self.labels {
        let mut checked = self.checked.contains(code);
        if ui.checkbox(&mut checked, label).changed() {
          if checked {
            self.checked.insert(code.clone());
          } else {
            self.checked.remove(code);
          }
          changed = true;
        }
      }
    });
    if changed {
      self.map.set_visible_districts(self.checked.iter().cloned());
    }
  }
}

impl eframe::App for DccaApp {
  fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
    let ctx = &ui.ctx().clone();
    egui::SidePanel::left("districts")
      .default_width(240.0)
      .resizable(true)
      .show(ctx, |ui| {
        ui.heading("Districts");
        self.district_filter(ui);
      });

    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
      let active = self.active_area.borrow();
      ui.label(active.as_ref().map_or_else(String::new, ToString::to_string));
    });

    egui::CentralPanel::default()
      .frame(egui::Frame::NONE)
      .show(ctx, |ui| {
        self.map.show(ui);
      });
  }
}

fn load_map(config: &Config) -> anyhow::Result<DccaMap<EguiMapHost>> {
  let locale = config.locale();
  let district_names = config
    .district_names_path
    .as_deref()
    .context("No district names file configured")?;
  let area_names = config
    .area_names_path
    .as_deref()
    .context("No area names file configured")?;
  let geometry = config
    .geometry_path
    .as_deref()
    .context("No geometry file configured")?;

  let districts = Districts::new(NameTable::from_file(district_names, locale)?)?;
  let area_names = NameTable::from_file(area_names, locale)?;
  let source = config.geometry_format().load(geometry)?;
  let palette = ColorAssigner::parse_palette(&config.palette())?;

  let host = EguiMapHost::new(config.center(), config.zoom());
  Ok(DccaMap::mount(
    host,
    source.as_ref(),
    districts,
    area_names,
    palette,
  )?)
}

fn main() -> anyhow::Result<()> {
  // init logger.
  env_logger::init();

  let config = Args::parse().into_config();
  let mut map = load_map(&config).context("Failed to load the DCCA map")?;

  let active_area = Rc::new(RefCell::new(None));
  let sink = Rc::clone(&active_area);
  map.set_active_area_observer(move |area| {
    log::info!("Active area: {area:?}");
    *sink.borrow_mut() = area.cloned();
  });

  let labels: Vec<_> = map.districts().labels().into_iter().collect();
  let checked = map.visible_districts().iter().cloned().collect();

  let options = eframe::NativeOptions {
    viewport: egui::ViewportBuilder {
      inner_size: Some(egui::vec2(1280.0, 900.0)),
      clamp_size_to_monitor_size: Some(true),
      ..Default::default()
    },
    ..Default::default()
  };

  eframe::run_native(
    "dccamap",
    options,
    Box::new(|_cc| {
      Ok(Box::new(DccaApp {
        map,
        labels,
        checked,
        active_area,
      }))
    }),
  )
  .map_err(|e| anyhow::anyhow!("{e}"))
}
