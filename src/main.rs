//! Black Hole Calc entry point
//!
//! The web build wires the calculator page to the animation. The native build
//! is a headless driver: it divides by zero, runs the collapse to the end at
//! nominal frame spacing and reports what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_host {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::Clamped;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, ImageData, KeyboardEvent};

    use black_hole_calc::audio::WebAudio;
    use black_hole_calc::renderer::Surface;
    use black_hole_calc::{App, FrameOutcome, FrameRequest, FrameScheduler, Key, Settings};

    /// Frame callbacks through `requestAnimationFrame`
    struct RafScheduler {
        callback: Rc<RefCell<Option<js_sys::Function>>>,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> FrameRequest {
            let callback = self.callback.borrow();
            let id = match (web_sys::window(), callback.as_ref()) {
                (Some(window), Some(callback)) => window
                    .request_animation_frame(callback)
                    .unwrap_or_else(|e| {
                        log::warn!("requestAnimationFrame failed: {e:?}");
                        0
                    }),
                _ => 0,
            };
            FrameRequest(id as u64)
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(request.0 as i32);
            }
        }
    }

    /// Page state: the app plus the DOM it draws into
    struct Host {
        app: App<RafScheduler, WebAudio>,
        bg: CanvasRenderingContext2d,
        fg: CanvasRenderingContext2d,
        bg_canvas: HtmlCanvasElement,
        fg_canvas: HtmlCanvasElement,
        calculator: Option<Element>,
        operation_text: Option<Element>,
        result_text: Option<Element>,
    }

    impl Host {
        fn press(&mut self, key: Key) {
            self.app.press(key, now_ms());
            self.sync_chrome();
            if key == Key::Clear {
                self.present();
            }
        }

        fn frame(&mut self, time: f64) {
            match self.app.on_frame(time) {
                FrameOutcome::Skipped => return,
                FrameOutcome::Halted => log::info!("Black hole consumed the screen"),
                FrameOutcome::Continue => {}
            }
            self.present();
        }

        fn resize(&mut self) {
            let (w, h) = window_size();
            for canvas in [&self.bg_canvas, &self.fg_canvas] {
                canvas.set_width(w);
                canvas.set_height(h);
            }
            self.app.on_surface_resize(w, h);
            self.present();
        }

        fn poll_timers(&mut self) {
            if self.app.poll_timers(now_ms()) {
                self.sync_chrome();
                self.present();
            }
        }

        /// Copy both surfaces onto their canvases
        fn present(&self) {
            let surfaces = self.app.animation().surfaces();
            for (ctx, surface) in [(&self.bg, &surfaces.background), (&self.fg, &surfaces.foreground)] {
                if let Err(e) = blit(ctx, surface) {
                    log::warn!("Blit failed: {e:?}");
                }
            }
        }

        /// Update the calculator text and hide it while the black hole is active
        fn sync_chrome(&self) {
            let calc = self.app.calculator();
            if let Some(el) = &self.operation_text {
                el.set_text_content(Some(calc.operation_text()));
            }
            if let Some(el) = &self.result_text {
                el.set_text_content(Some(&calc.display().to_string()));
                let _ = el
                    .class_list()
                    .toggle_with_force("error-message", calc.is_collapsed());
            }
            if let Some(el) = &self.calculator {
                let _ = el
                    .class_list()
                    .toggle_with_force("disappear", self.app.is_active());
            }
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn window_size() -> (u32, u32) {
        let Some(window) = web_sys::window() else {
            return (1, 1);
        };
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as u32;
        (dim(window.inner_width()), dim(window.inner_height()))
    }

    fn blit(ctx: &CanvasRenderingContext2d, surface: &Surface) -> Result<(), JsValue> {
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(surface.as_bytes()),
            surface.width(),
            surface.height(),
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)
    }

    fn canvas_2d(document: &web_sys::Document, id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no #{id} canvas")))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok((canvas, ctx))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Black Hole Calc starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let (bg_canvas, bg) = canvas_2d(&document, "bg")?;
        let (fg_canvas, fg) = canvas_2d(&document, "fg")?;
        let (w, h) = window_size();
        for canvas in [&bg_canvas, &fg_canvas] {
            canvas.set_width(w);
            canvas.set_height(h);
        }

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let callback = Rc::new(RefCell::new(None));
        let scheduler = RafScheduler {
            callback: callback.clone(),
        };
        let audio = WebAudio::new(settings.effective_volume());

        let host = Rc::new(RefCell::new(Host {
            app: App::new(&settings, w, h, scheduler, audio, seed),
            bg,
            fg,
            bg_canvas,
            fg_canvas,
            calculator: document.query_selector(".calculator").ok().flatten(),
            operation_text: document.get_element_by_id("operationText"),
            result_text: document.get_element_by_id("resultText"),
        }));

        // The first request went out before the callback existed; re-arm it
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                host.borrow_mut().frame(time);
            });
            *callback.borrow_mut() = Some(closure.as_ref().unchecked_ref::<js_sys::Function>().clone());
            closure.forget();
        }
        {
            let mut h = host.borrow_mut();
            h.app.animation_mut().stop();
            h.app.animation_mut().start();
            h.sync_chrome();
            h.present();
        }

        setup_buttons(&document, host.clone())?;
        setup_keyboard(&window, host.clone())?;
        setup_resize(&window, host.clone())?;
        if settings.auto_reset_ms.is_some() {
            let closure = Closure::<dyn FnMut()>::new(move || host.borrow_mut().poll_timers());
            window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                100,
            )?;
            closure.forget();
        }

        log::info!("Black Hole Calc running!");
        Ok(())
    }

    /// Calculator buttons, keyed by their label
    fn setup_buttons(document: &web_sys::Document, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let buttons = document.query_selector_all("#num, #operator, #equal, #clear")?;
        for i in 0..buttons.length() {
            let Some(node) = buttons.item(i) else { continue };
            let label = node.text_content().unwrap_or_default();
            let Some(key) = Key::from_name(label.trim()) else {
                log::warn!("Unrecognized calculator button '{label}'");
                continue;
            };

            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut h = host.borrow_mut();
                h.app.audio().resume();
                h.press(key);
            });
            node.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = Key::from_name(&event.key()) {
                event.prevent_default();
                let mut h = host.borrow_mut();
                h.app.audio().resume();
                h.press(key);
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(window: &web_sys::Window, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            host.borrow_mut().resize();
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web_host::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, bail};

    use black_hole_calc::audio::LogAudio;
    use black_hole_calc::calc::Operator;
    use black_hole_calc::renderer::Surface;
    use black_hole_calc::{App, FrameOutcome, Key, ManualScheduler, QualityPreset, Settings};

    const WIDTH: u32 = 800;
    const HEIGHT: u32 = 600;
    /// Give up if the collapse never finishes
    const MAX_FRAMES: u64 = 100_000;

    /// `black-hole-calc [settings.json | low | medium | high] [last-frame.ppm]`
    pub fn run() -> anyhow::Result<()> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(arg) => match arg.parse::<QualityPreset>() {
                Ok(preset) => Settings::from_preset(preset),
                Err(_) => Settings::load_file(Path::new(&arg))?,
            },
            None => Settings::default(),
        };
        let snapshot_path = args.next().map(PathBuf::from);
        log::info!("Quality {}, {} stars", settings.quality, settings.star_count());

        let seed = settings.seed.unwrap_or_else(wall_clock_seed);
        let audio = LogAudio::new(settings.effective_volume());
        let mut app = App::new(&settings, WIDTH, HEIGHT, ManualScheduler::new(), audio, seed);

        let keys = [
            Key::Digit('1'),
            Key::Digit('0'),
            Key::Operator(Operator::Divide),
            Key::Digit('0'),
            Key::Equals,
        ];
        for key in keys {
            app.press(key, 0.0);
        }
        log::info!("Calculator shows: {}", app.calculator().display());
        if !app.is_active() {
            bail!("division by zero did not start the black hole");
        }

        let tick_ms = f64::from(settings.tick_unit_ms);
        let mut now = 0.0;
        let mut last_frame: Option<Surface> = None;
        loop {
            if app.animation_mut().scheduler_mut().fire().is_none() {
                bail!("no frame pending after {} frames", app.animation().frames());
            }
            match app.on_frame(now) {
                FrameOutcome::Continue => {
                    if snapshot_path.is_some() {
                        last_frame = Some(app.animation().surfaces().composite());
                    }
                }
                FrameOutcome::Halted => break,
                FrameOutcome::Skipped => bail!("frame skipped at {now:.1}ms"),
            }
            if app.poll_timers(now) {
                log::info!("Auto-reset fired before the collapse finished");
                break;
            }
            if app.animation().frames() >= MAX_FRAMES {
                bail!("collapse did not finish within {MAX_FRAMES} frames");
            }
            now += tick_ms;
        }

        let growth = app.animation().growth();
        log::info!(
            "Collapse finished: {} frames, {:.0}ms, radius {:.1}/{:.1}, {} of {} stars left",
            app.animation().frames(),
            now,
            growth.radius(),
            growth.max_radius(),
            app.animation().field().len(),
            app.animation().star_count(),
        );

        if let (Some(path), Some(frame)) = (snapshot_path, last_frame) {
            std::fs::write(&path, frame.to_ppm())
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Last frame written to {}", path.display());
        }
        Ok(())
    }

    fn wall_clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Black Hole Calc (headless) starting...");
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
