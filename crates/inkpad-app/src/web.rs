//! WebAssembly entry point and page binding.

use crate::config::{ElementIds, MountConfig};
use crate::dom::{self, Listener};
use crate::error::MountError;
use inkpad_core::{
    BrushMode, DrawingController, PointerEvent, Response, SurfaceConfig, Viewport, parse_color,
    parse_width,
};
use kurbo::Point;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, ImageData, Window,
};

thread_local! {
    static DEFAULT_SURFACE: RefCell<Option<MountedSurface>> = const { RefCell::new(None) };
}

/// Page elements a surface is bound to.
struct Controls {
    canvas: HtmlCanvasElement,
    color: HtmlInputElement,
    size: HtmlInputElement,
    mode: HtmlSelectElement,
    undo: HtmlElement,
    clear: HtmlElement,
    save: HtmlElement,
}

impl Controls {
    /// Find every element, `None` if any is missing.
    fn find(document: &Document, ids: &ElementIds) -> Option<Self> {
        let found = Self {
            canvas: find(document, &ids.canvas)?,
            color: find(document, &ids.color)?,
            size: find(document, &ids.size)?,
            mode: find(document, &ids.mode)?,
            undo: find(document, &ids.undo)?,
            clear: find(document, &ids.clear)?,
            save: find(document, &ids.save)?,
        };
        Some(found)
    }
}

fn find<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let element = dom::get_element(document, id);
    if element.is_none() {
        log::warn!("Element #{} not found; drawing surface stays inert", id);
    }
    element
}

/// Controller plus the browser objects it presents to.
struct Shell {
    controller: DrawingController,
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl Shell {
    fn viewport(&self) -> Viewport {
        let rect = self.canvas.get_bounding_client_rect();
        Viewport::new(rect.width(), rect.height(), self.window.device_pixel_ratio())
    }

    fn surface_origin(&self) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(rect.left(), rect.top())
    }

    /// Match the canvas attributes to the controller's backing raster.
    ///
    /// The displayed size stays under the page's stylesheet so the next
    /// window resize is measured from layout.
    fn sync_canvas_size(&self) {
        let (width, height) = self.controller.surface().viewport().backing_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn resize(&mut self) {
        let viewport = self.viewport();
        self.controller.resize(viewport);
        self.sync_canvas_size();
        self.present();
    }

    /// Upload the damaged region of the raster to the canvas.
    fn present(&mut self) {
        let Some(damage) = self.controller.surface_mut().take_damage() else {
            return;
        };
        let pixels = self.controller.surface().raster().region(damage);
        let result = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&pixels),
            damage.width,
            damage.height,
        )
        .and_then(|image| {
            self.context
                .put_image_data(&image, damage.x as f64, damage.y as f64)
        });
        if let Err(e) = result {
            log::warn!("Failed to present surface: {:?}", e);
        }
    }

    fn apply(&mut self, event: &Event, response: Response) {
        if response.prevent_default {
            event.prevent_default();
        }
        if response.repaint {
            self.present();
        }
        if let Some(image) = response.download {
            self.download(&image.file_name, &image.png);
        }
    }

    fn pointer(&mut self, event: &Event, make: fn(Point, Point) -> PointerEvent) {
        let Some(position) = dom::client_position(event) else {
            return;
        };
        let origin = self.surface_origin();
        let response = self.controller.handle_pointer(make(position, origin));
        self.apply(event, response);
    }

    fn save(&self) {
        match self.controller.export() {
            Ok(image) => self.download(&image.file_name, &image.png),
            Err(e) => log::warn!("Export failed: {}", e),
        }
    }

    fn download(&self, file_name: &str, png: &[u8]) {
        if let Err(e) = dom::download_binary_file(&self.document, file_name, png, "image/png") {
            log::error!("Failed to download {}: {:?}", file_name, e);
        }
    }
}

fn pointer_down(position: Point, surface_origin: Point) -> PointerEvent {
    PointerEvent::Down {
        position,
        surface_origin,
    }
}

fn pointer_move(position: Point, surface_origin: Point) -> PointerEvent {
    PointerEvent::Move {
        position,
        surface_origin,
    }
}

/// A drawing surface bound to the page. Dropping or unmounting it removes
/// every listener it registered.
#[wasm_bindgen]
pub struct MountedSurface {
    shell: Rc<RefCell<Shell>>,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl MountedSurface {
    /// Detach from the page.
    pub fn unmount(self) {
        log::info!("Unmounting drawing surface");
    }

    /// Number of undo steps available.
    #[wasm_bindgen(js_name = undoDepth)]
    pub fn undo_depth(&self) -> usize {
        self.shell.borrow().controller.history().len()
    }

    /// Undo the last stroke or clear.
    pub fn undo(&self) {
        let mut shell = self.shell.borrow_mut();
        if shell.controller.undo() {
            shell.present();
        }
    }

    /// Clear the surface.
    pub fn clear(&self) {
        let mut shell = self.shell.borrow_mut();
        shell.controller.clear();
        shell.present();
    }

    /// Download the drawing.
    pub fn save(&self) {
        self.shell.borrow().save();
    }
}

/// Mount a drawing surface with an optional JSON configuration.
///
/// Returns `None` when the canvas or any control is missing, leaving the
/// page untouched.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<Option<MountedSurface>, JsValue> {
    let config = MountConfig::from_json(config_json.as_deref())?;
    Ok(mount_with(config)?)
}

fn mount_with(config: MountConfig) -> Result<Option<MountedSurface>, MountError> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    let Some(document) = window.document() else {
        return Ok(None);
    };
    let Some(controls) = Controls::find(&document, &config.elements) else {
        return Ok(None);
    };
    let Some(context) = controls
        .canvas
        .get_context("2d")?
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        log::warn!("Canvas 2D context unavailable; drawing surface stays inert");
        return Ok(None);
    };

    let shell = create_shell(config.surface, window.clone(), document, &controls, context);
    let listeners = register_listeners(&shell, &window, &controls)?;
    log::info!("Mounted drawing surface on #{}", config.elements.canvas);

    Ok(Some(MountedSurface {
        shell,
        _listeners: listeners,
    }))
}

fn create_shell(
    config: SurfaceConfig,
    window: Window,
    document: Document,
    controls: &Controls,
    context: CanvasRenderingContext2d,
) -> Rc<RefCell<Shell>> {
    let rect = controls.canvas.get_bounding_client_rect();
    let viewport = Viewport::new(rect.width(), rect.height(), window.device_pixel_ratio());
    let mut controller = DrawingController::new(config, viewport);

    if let Some(color) = parse_color(&controls.color.value()) {
        controller.set_color(color.into());
    }
    controller.set_width(parse_width(&controls.size.value()));
    controller.set_mode(BrushMode::from_control_value(&controls.mode.value()));

    let mut shell = Shell {
        controller,
        window,
        document,
        canvas: controls.canvas.clone(),
        context,
    };
    shell.sync_canvas_size();
    shell.present();
    Rc::new(RefCell::new(shell))
}

fn register_listeners(
    shell: &Rc<RefCell<Shell>>,
    window: &Window,
    controls: &Controls,
) -> Result<Vec<Listener>, JsValue> {
    let canvas: &web_sys::EventTarget = controls.canvas.as_ref();
    let mut listeners = Vec::new();

    for event in ["mousedown", "touchstart"] {
        let shell = shell.clone();
        listeners.push(Listener::non_passive(canvas, event, move |e| {
            shell.borrow_mut().pointer(&e, pointer_down);
        })?);
    }
    for event in ["mousemove", "touchmove"] {
        let shell = shell.clone();
        listeners.push(Listener::non_passive(canvas, event, move |e| {
            shell.borrow_mut().pointer(&e, pointer_move);
        })?);
    }
    for (event, pointer_event) in [
        ("mouseup", PointerEvent::Up),
        ("mouseleave", PointerEvent::Leave),
        ("touchend", PointerEvent::Up),
    ] {
        let shell = shell.clone();
        listeners.push(Listener::new(canvas, event, move |e| {
            let mut shell = shell.borrow_mut();
            let response = shell.controller.handle_pointer(pointer_event);
            shell.apply(&e, response);
        })?);
    }

    {
        let shell = shell.clone();
        let color = controls.color.clone();
        listeners.push(Listener::new(controls.color.as_ref(), "change", move |_| {
            match parse_color(&color.value()) {
                Some(parsed) => shell.borrow_mut().controller.set_color(parsed.into()),
                None => log::debug!("Ignoring color value {:?}", color.value()),
            }
        })?);
    }
    {
        let shell = shell.clone();
        let size = controls.size.clone();
        listeners.push(Listener::new(controls.size.as_ref(), "input", move |_| {
            shell
                .borrow_mut()
                .controller
                .set_width(parse_width(&size.value()));
        })?);
    }
    {
        let shell = shell.clone();
        let mode = controls.mode.clone();
        listeners.push(Listener::new(controls.mode.as_ref(), "change", move |_| {
            shell
                .borrow_mut()
                .controller
                .set_mode(BrushMode::from_control_value(&mode.value()));
        })?);
    }

    {
        let shell = shell.clone();
        listeners.push(Listener::new(controls.undo.as_ref(), "click", move |_| {
            let mut shell = shell.borrow_mut();
            if shell.controller.undo() {
                shell.present();
            }
        })?);
    }
    {
        let shell = shell.clone();
        listeners.push(Listener::new(controls.clear.as_ref(), "click", move |_| {
            let mut shell = shell.borrow_mut();
            shell.controller.clear();
            shell.present();
        })?);
    }
    {
        let shell = shell.clone();
        listeners.push(Listener::new(controls.save.as_ref(), "click", move |_| {
            shell.borrow().save();
        })?);
    }

    {
        let shell = shell.clone();
        listeners.push(Listener::new(window.as_ref(), "resize", move |_| {
            shell.borrow_mut().resize();
        })?);
    }
    {
        let shell = shell.clone();
        listeners.push(Listener::new(window.as_ref(), "keydown", move |e| {
            let Some(press) = dom::key_press(&e) else {
                return;
            };
            let mut shell = shell.borrow_mut();
            let response = shell.controller.handle_key(&press);
            shell.apply(&e, response);
        })?);
    }

    Ok(listeners)
}

/// Tear down the surface mounted at startup, if any.
#[wasm_bindgen]
pub fn unmount_default() {
    DEFAULT_SURFACE.with(|cell| cell.borrow_mut().take());
}

/// Initialize logging and mount the default surface.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }

    log::info!("Starting Inkpad (WASM)");
    inkpad_core::ShortcutRegistry::log_all();

    match mount_with(MountConfig::default()) {
        Ok(Some(surface)) => {
            DEFAULT_SURFACE.with(|cell| *cell.borrow_mut() = Some(surface));
        }
        Ok(None) => log::info!("No drawing surface on this page"),
        Err(e) => log::error!("Failed to mount drawing surface: {}", e),
    }
}
