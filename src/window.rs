//! SDL2 window, event translation and frame pacing.
//!
//! Nothing here draws: the engine renders into its own buffer and
//! [`Window::present`] streams the finished frame to the screen.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
}

/// Keys bound to editor actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    P,
    H,
    C,
    N,
    J,
    K,
    Plus,
    Minus,
}

impl Key {
    fn from_keycode(keycode: Keycode) -> Option<Self> {
        Some(match keycode {
            Keycode::P => Key::P,
            Keycode::H => Key::H,
            Keycode::C => Key::C,
            Keycode::N => Key::N,
            Keycode::J => Key::J,
            Keycode::K => Key::K,
            Keycode::Plus | Keycode::Equals | Keycode::KpPlus => Key::Plus,
            Keycode::Minus | Keycode::KpMinus => Key::Minus,
            _ => return None,
        })
    }
}

/// Input gathered during one frame.
///
/// Edge-triggered fields (`keys_pressed`, `select_started`, `select_ended`,
/// `mouse_delta`, `wheel`) are reset by [`InputState::begin_frame`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Cursor position in window pixels.
    pub mouse_position: (i32, i32),
    pub mouse_delta: (i32, i32),
    /// Right button held.
    pub orbiting: bool,
    /// Wheel notches, positive away from the user.
    pub wheel: i32,
    /// Left button went down this frame.
    pub select_started: bool,
    /// Left button went up this frame.
    pub select_ended: bool,
    pub keys_pressed: Vec<Key>,
}

impl InputState {
    pub fn begin_frame(&mut self) {
        self.mouse_delta = (0, 0);
        self.wheel = 0;
        self.select_started = false;
        self.select_ended = false;
        self.keys_pressed.clear();
    }

    /// Folds one SDL event into the frame's input. Window-level events are
    /// returned to the caller instead.
    pub fn record(&mut self, event: &Event) -> WindowEvent {
        match *event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => return WindowEvent::Quit,
            Event::Window {
                win_event: sdl2::event::WindowEvent::Resized(w, h),
                ..
            } => return WindowEvent::Resize(w.max(0) as u32, h.max(0) as u32),
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => self.keys_pressed.extend(Key::from_keycode(keycode)),
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => {
                self.mouse_position = (x, y);
                self.mouse_delta.0 += xrel;
                self.mouse_delta.1 += yrel;
            }
            Event::MouseButtonDown { mouse_btn, .. } => match mouse_btn {
                MouseButton::Left => self.select_started = true,
                MouseButton::Right => self.orbiting = true,
                _ => {}
            },
            Event::MouseButtonUp { mouse_btn, .. } => match mouse_btn {
                MouseButton::Left => self.select_ended = true,
                MouseButton::Right => self.orbiting = false,
                _ => {}
            },
            Event::MouseWheel { y, .. } => self.wheel += y,
            _ => {}
        }
        WindowEvent::None
    }
}

/// Sleeps away the rest of each frame to hold a target rate.
pub struct FrameLimiter {
    frame_millis: u64,
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, fps: u32) -> Self {
        Self {
            frame_millis: 1000 / u64::from(fps.max(1)),
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Returns the milliseconds since the previous call, after waiting.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let elapsed = window.timer().ticks64() - self.previous_frame_time;
        if elapsed < self.frame_millis {
            std::thread::sleep(std::time::Duration::from_millis(self.frame_millis - elapsed));
        }

        let now = window.timer().ticks64();
        let delta = now - self.previous_frame_time;
        self.previous_frame_time = now;
        delta
    }
}

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    // Field order matters: the texture borrows from the creator and must drop first.
    texture: Texture<'static>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let canvas = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?
            .into_canvas()
            .build()
            .map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let texture = streaming_texture(&texture_creator, width, height)?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump: sdl_context.event_pump()?,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Drains pending events into `input`. A quit wins over everything else;
    /// otherwise the last resize of the batch is returned.
    pub fn poll_events(&mut self, input: &mut InputState) -> WindowEvent {
        let mut result = WindowEvent::None;
        for event in self.event_pump.poll_iter() {
            match input.record(&event) {
                WindowEvent::Quit => return WindowEvent::Quit,
                WindowEvent::Resize(w, h) => result = WindowEvent::Resize(w, h),
                WindowEvent::None => {}
            }
        }
        result
    }

    /// Shows a frame of ARGB8888 pixels sized to the window.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.texture = streaming_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

fn streaming_texture(
    creator: &TextureCreator<WindowContext>,
    width: u32,
    height: u32,
) -> Result<Texture<'static>, String> {
    // SAFETY: the creator is boxed inside `Window`, so its address is stable,
    // and `Window` declares `texture` before `texture_creator`, so every
    // texture is dropped before the creator it borrows.
    let creator: &'static TextureCreator<WindowContext> = unsafe { &*(creator as *const _) };
    creator
        .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
        .map_err(|e| e.to_string())
}
