//! Window Sink
//!
//! An eframe window running its event loop on a dedicated thread. The driver
//! draws into a shared frame buffer; the window thread shows the last
//! presented frame as a texture and turns key presses into edge-triggered
//! signals. One lock guards the frame buffer and is shared by both threads.

use super::DisplaySink;

use eframe::egui;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed window resolution
pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 1024;

const PIXELS: usize = (WINDOW_WIDTH * WINDOW_HEIGHT) as usize;

/// How often the window thread polls input while idle
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `open` waits for the window to come up
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

struct Surface {
    drawing: Vec<egui::Color32>,
    presented: Vec<egui::Color32>,
    generation: u64,
}

struct Shared {
    surface: Mutex<Surface>,
    context: Mutex<Option<egui::Context>>,
    open: AtomicBool,
    stop: AtomicBool,
    key_pressed: AtomicBool,
    key_presses: AtomicU64,
}

impl Shared {
    fn record_key_press(&self) {
        self.key_presses.fetch_add(1, Ordering::AcqRel);
        self.key_pressed.store(true, Ordering::Release);
    }

    fn wake(&self) {
        if let Some(ctx) = lock(&self.context).as_ref() {
            ctx.request_repaint();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Display sink backed by a native window.
///
/// winit allows one event loop per process, so a sink can only be opened once.
pub struct WindowSink {
    title: String,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WindowSink {
    pub fn new(title: impl Into<String>) -> Self {
        let shared = Shared {
            surface: Mutex::new(Surface {
                drawing: vec![egui::Color32::BLACK; PIXELS],
                presented: vec![egui::Color32::BLACK; PIXELS],
                generation: 0,
            }),
            context: Mutex::new(None),
            open: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            key_pressed: AtomicBool::new(false),
            key_presses: AtomicU64::new(0),
        };

        Self {
            title: title.into(),
            shared: Arc::new(shared),
            worker: Mutex::new(None),
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }
}

impl DisplaySink for WindowSink {
    fn open(&self) -> bool {
        let mut worker = lock(&self.worker);

        if let Some(handle) = worker.as_ref() {
            if !handle.is_finished() {
                if let Some(ctx) = lock(&self.shared.context).as_ref() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                }
                return self.is_open();
            }
        }
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }

        self.shared.stop.store(false, Ordering::Release);
        self.shared.key_pressed.store(false, Ordering::Release);

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let shared = Arc::clone(&self.shared);
        let title = self.title.clone();

        let spawned = thread::Builder::new()
            .name("memviz-window".to_string())
            .spawn(move || run_window(&title, shared, ready_tx));

        match spawned {
            Ok(handle) => *worker = Some(handle),
            Err(err) => {
                warn!(%err, "cannot start window thread");
                return false;
            }
        }
        drop(worker);

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(true) => {
                debug!(title = %self.title, "window open");
                true
            }
            Ok(false) | Err(_) => {
                warn!("window did not open");
                false
            }
        }
    }

    fn close(&self) -> bool {
        let Some(handle) = lock(&self.worker).take() else {
            return false;
        };

        // The window thread must be gone before the surface can go away
        self.shared.stop.store(true, Ordering::Release);
        self.shared.wake();
        if handle.join().is_err() {
            warn!("window thread panicked");
        }

        self.shared.open.store(false, Ordering::Release);
        debug!("window closed");
        true
    }

    fn width(&self) -> u32 {
        WINDOW_WIDTH
    }

    fn height(&self) -> u32 {
        WINDOW_HEIGHT
    }

    fn clear(&self, r: u8, g: u8, b: u8) -> bool {
        if !self.is_open() {
            return false;
        }
        lock(&self.shared.surface)
            .drawing
            .fill(egui::Color32::from_rgb(r, g, b));
        true
    }

    fn draw_point(&self, x: u32, y: u32, r: u8, g: u8, b: u8) -> bool {
        if !self.is_open() || x >= WINDOW_WIDTH || y >= WINDOW_HEIGHT {
            return false;
        }
        let index = y as usize * WINDOW_WIDTH as usize + x as usize;
        lock(&self.shared.surface).drawing[index] = egui::Color32::from_rgb(r, g, b);
        true
    }

    fn draw_levels(&self, levels: &[u8]) -> usize {
        if !self.is_open() {
            return 0;
        }

        let count = levels.len().min(PIXELS);
        let mut surface = lock(&self.shared.surface);
        for (pixel, &level) in surface.drawing[..count].iter_mut().zip(levels) {
            *pixel = egui::Color32::from_gray(level);
        }
        count
    }

    fn present(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        {
            let mut surface = lock(&self.shared.surface);
            let Surface {
                drawing,
                presented,
                generation,
            } = &mut *surface;
            presented.copy_from_slice(drawing);
            *generation += 1;
        }
        self.shared.wake();
        true
    }

    fn poll_key_pressed(&self) -> bool {
        self.shared.key_pressed.swap(false, Ordering::AcqRel)
    }

    fn block_until_key_pressed(&self) -> bool {
        let start = self.shared.key_presses.load(Ordering::Acquire);
        while self.shared.key_presses.load(Ordering::Acquire) == start {
            if !self.is_open() {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
        true
    }
}

impl Drop for WindowSink {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_window(title: &str, shared: Arc<Shared>, ready: SyncSender<bool>) {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32])
            .with_resizable(false),
        // The sampling loop owns the main thread
        event_loop_builder: Some(Box::new(|builder| {
            #[cfg(target_os = "linux")]
            {
                winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(builder, true);
                winit::platform::wayland::EventLoopBuilderExtWayland::with_any_thread(
                    builder, true,
                );
            }
        })),
        ..Default::default()
    };

    let app_shared = Arc::clone(&shared);
    let app_ready = ready.clone();
    let result = eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            *lock(&app_shared.context) = Some(cc.egui_ctx.clone());
            app_shared.open.store(true, Ordering::Release);
            let _ = app_ready.try_send(true);
            Ok(Box::new(SurfaceApp::new(app_shared)))
        }),
    );

    shared.open.store(false, Ordering::Release);
    lock(&shared.context).take();

    if let Err(err) = result {
        warn!(%err, "window event loop failed");
        let _ = ready.try_send(false);
    }
}

/// eframe app that mirrors the presented frame
struct SurfaceApp {
    shared: Arc<Shared>,
    texture: Option<egui::TextureHandle>,
    shown_generation: u64,
}

impl SurfaceApp {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            texture: None,
            shown_generation: 0,
        }
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let surface = lock(&self.shared.surface);
        if self.texture.is_some() && surface.generation == self.shown_generation {
            return;
        }

        let mut image = egui::ColorImage::new(
            [WINDOW_WIDTH as usize, WINDOW_HEIGHT as usize],
            egui::Color32::BLACK,
        );
        image.pixels.copy_from_slice(&surface.presented);
        self.shown_generation = surface.generation;
        drop(surface);

        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::NEAREST);
        } else {
            self.texture = Some(ctx.load_texture("memory", image, egui::TextureOptions::NEAREST));
        }
    }
}

impl eframe::App for SurfaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.shared.stop.load(Ordering::Acquire) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let (key_down, close_requested) = ctx.input(|input| {
            let key_down = input.events.iter().any(|event| {
                matches!(
                    event,
                    egui::Event::Key {
                        pressed: true,
                        repeat: false,
                        ..
                    }
                )
            });
            (key_down, input.viewport().close_requested())
        });

        if close_requested {
            // Closing the window counts as a key press; the driver tears it down
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
        if key_down || close_requested {
            self.shared.record_key_press();
        }

        self.upload(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(texture) = &self.texture {
                    ui.image((texture.id(), ui.available_size()));
                }
            });

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
