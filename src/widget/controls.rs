//! Leaf controls: label, button, toggle, progress bar, separator.
//!
//! Labels and buttons accept `_`-prefixed mnemonics; the marker is
//! stripped when the text is set and the bare key is kept alongside.
//! Buttons route "activate" into "clicked"; toggles flip first and then
//! report both "toggled" and "clicked".

use crate::accel::strip_mnemonic;
use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::render::{ellipsize, string_width, Style, Surface};
use crate::toolkit::Toolkit;
use crate::types::{Orientation, Rect, Size, TextAlign};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};
use crate::widget::window;

/// Cells a button frame adds around its label.
const BUTTON_CHROME: i32 = 4;

// =============================================================================
// Label
// =============================================================================

pub struct LabelData {
    pub text: String,
    pub mnemonic: Option<char>,
    pub align: TextAlign,
}

pub static LABEL_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Label",
    parent: Some(&WIDGET_CLASS),
    signals: &[],
    native_handler: None,
};

pub fn label_new(tk: &mut Toolkit, text: &str) -> ObjectId {
    let (text, mnemonic) = strip_mnemonic(text);
    tk.new_object(
        &LABEL_CLASS,
        Some(WidgetCore::default()),
        ClassData::Label(LabelData {
            text,
            mnemonic,
            align: TextAlign::Left,
        }),
    )
}

pub fn set_label(tk: &mut Toolkit, id: ObjectId, text: &str) {
    let (text, mnemonic) = strip_mnemonic(text);
    match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::Label(d)) => {
            d.text = text;
            d.mnemonic = mnemonic;
        }
        Some(ClassData::Button(d)) => {
            d.label = text;
            d.mnemonic = mnemonic;
        }
        Some(ClassData::Toggle(d)) => {
            d.label = text;
            d.mnemonic = mnemonic;
        }
        _ => return,
    }
    if core::is_realized(tk, id) {
        if let Some(top) = core::toplevel_of(tk, id) {
            window::remove_accelerator_target(tk, top, id);
        }
        core::register_mnemonic(tk, id);
    }
    core::queue_resize(tk, id);
}

pub fn set_align(tk: &mut Toolkit, id: ObjectId, align: TextAlign) {
    if let Some(ClassData::Label(d)) = tk.object_mut(id).map(|o| &mut o.data) {
        d.align = align;
    }
}

/// Mnemonic key of a label, button or toggle, if its text carried one.
pub fn mnemonic(tk: &Toolkit, id: ObjectId) -> Option<char> {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Label(d)) => d.mnemonic,
        Some(ClassData::Button(d)) => d.mnemonic,
        Some(ClassData::Toggle(d)) => d.mnemonic,
        _ => None,
    }
}

pub fn label_size_request(tk: &Toolkit, id: ObjectId) -> Size {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Label(d)) => Size::new(string_width(&d.text), 1),
        _ => Size::ZERO,
    }
}

pub fn draw_label(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(ClassData::Label(d)) = tk.object(id).map(|o| &o.data) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    let text = ellipsize(&d.text, alloc.width.max(0));
    let w = string_width(&text);
    let x = match d.align {
        TextAlign::Left => alloc.x,
        TextAlign::Center => alloc.x + (alloc.width - w) / 2,
        TextAlign::Right => alloc.right() - w,
    };
    surface.draw_text(x, alloc.y, &text, clip, Style::default());
}

// =============================================================================
// Button & toggle
// =============================================================================

pub struct ButtonData {
    pub label: String,
    pub mnemonic: Option<char>,
}

pub struct ToggleData {
    pub label: String,
    pub mnemonic: Option<char>,
    pub active: bool,
}

pub static BUTTON_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Button",
    parent: Some(&WIDGET_CLASS),
    signals: &[
        SignalSpec {
            name: "clicked",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "activate",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: Some(button_activate_default),
        },
    ],
    native_handler: None,
};

pub static TOGGLE_CLASS: ClassDescriptor = ClassDescriptor {
    name: "ToggleButton",
    parent: Some(&BUTTON_CLASS),
    signals: &[
        SignalSpec {
            name: "toggled",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "activate",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: Some(toggle_activate_default),
        },
    ],
    native_handler: None,
};

pub fn button_new(tk: &mut Toolkit, label: &str) -> ObjectId {
    let (label, mnemonic) = strip_mnemonic(label);
    tk.new_object(
        &BUTTON_CLASS,
        Some(WidgetCore::default()),
        ClassData::Button(ButtonData { label, mnemonic }),
    )
}

pub fn toggle_new(tk: &mut Toolkit, label: &str) -> ObjectId {
    let (label, mnemonic) = strip_mnemonic(label);
    tk.new_object(
        &TOGGLE_CLASS,
        Some(WidgetCore::default()),
        ClassData::Toggle(ToggleData {
            label,
            mnemonic,
            active: false,
        }),
    )
}

fn button_activate_default(tk: &mut Toolkit, id: ObjectId, _args: &SignalArgs) -> Option<SignalValue> {
    tk.emit(id, "clicked", SignalArgs::None);
    None
}

/// Toggle flips its state before any observer runs, so "toggled"
/// handlers read the new value.
fn toggle_activate_default(tk: &mut Toolkit, id: ObjectId, _args: &SignalArgs) -> Option<SignalValue> {
    if let Some(ClassData::Toggle(d)) = tk.object_mut(id).map(|o| &mut o.data) {
        d.active = !d.active;
    }
    tk.emit(id, "toggled", SignalArgs::None);
    tk.emit(id, "clicked", SignalArgs::None);
    None
}

pub fn is_active(tk: &Toolkit, id: ObjectId) -> bool {
    matches!(tk.object(id).map(|o| &o.data), Some(ClassData::Toggle(d)) if d.active)
}

pub fn set_active(tk: &mut Toolkit, id: ObjectId, active: bool) {
    let flip = match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::Toggle(d)) if d.active != active => {
            d.active = active;
            true
        }
        _ => false,
    };
    if flip {
        tk.emit(id, "toggled", SignalArgs::None);
    }
}

/// Emit the activation a pointer click or accelerator would produce.
pub fn click(tk: &mut Toolkit, id: ObjectId) {
    tk.emit(id, "activate", SignalArgs::None);
}

pub fn button_size_request(tk: &Toolkit, id: ObjectId) -> Size {
    let label = match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Button(d)) => &d.label,
        Some(ClassData::Toggle(d)) => &d.label,
        _ => return Size::ZERO,
    };
    Size::new(string_width(label) + BUTTON_CHROME, 1)
}

pub fn draw_button(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let (label, indicator) = match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Button(d)) => (&d.label, None),
        Some(ClassData::Toggle(d)) => (&d.label, Some(d.active)),
        _ => return,
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    let inner = (alloc.width - BUTTON_CHROME).max(1);
    let text = match indicator {
        None => format!("[ {} ]", ellipsize(label, inner)),
        Some(true) => format!("[x] {}", ellipsize(label, inner)),
        Some(false) => format!("[ ] {}", ellipsize(label, inner)),
    };
    surface.draw_text(alloc.x, alloc.y, &text, clip, Style::default());
}

// =============================================================================
// Progress bar
// =============================================================================

pub struct ProgressData {
    /// Completed fraction, clamped to 0.0..=1.0.
    pub fraction: f64,
}

pub static PROGRESS_CLASS: ClassDescriptor = ClassDescriptor {
    name: "ProgressBar",
    parent: Some(&WIDGET_CLASS),
    signals: &[],
    native_handler: None,
};

pub fn progress_new(tk: &mut Toolkit) -> ObjectId {
    tk.new_object(
        &PROGRESS_CLASS,
        Some(WidgetCore::default()),
        ClassData::Progress(ProgressData { fraction: 0.0 }),
    )
}

pub fn set_fraction(tk: &mut Toolkit, id: ObjectId, fraction: f64) {
    if let Some(ClassData::Progress(d)) = tk.object_mut(id).map(|o| &mut o.data) {
        d.fraction = fraction.clamp(0.0, 1.0);
    }
}

pub fn fraction(tk: &Toolkit, id: ObjectId) -> f64 {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Progress(d)) => d.fraction,
        _ => 0.0,
    }
}

pub fn progress_size_request(_tk: &Toolkit, _id: ObjectId) -> Size {
    Size::new(10, 1)
}

pub fn draw_progress(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(ClassData::Progress(d)) = tk.object(id).map(|o| &o.data) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    let filled = ((alloc.width as f64) * d.fraction).round() as i32;
    for x in alloc.x..alloc.right() {
        let symbol = if x - alloc.x < filled { "█" } else { "░" };
        surface.draw_text(x, alloc.y, symbol, clip, Style::default());
    }
}

// =============================================================================
// Separator
// =============================================================================

pub struct SeparatorData {
    pub orientation: Orientation,
}

pub static SEPARATOR_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Separator",
    parent: Some(&WIDGET_CLASS),
    signals: &[],
    native_handler: None,
};

pub fn separator_new(tk: &mut Toolkit, orientation: Orientation) -> ObjectId {
    tk.new_object(
        &SEPARATOR_CLASS,
        Some(WidgetCore::default()),
        ClassData::Separator(SeparatorData { orientation }),
    )
}

pub fn separator_size_request(_tk: &Toolkit, _id: ObjectId) -> Size {
    Size::new(1, 1)
}

pub fn draw_separator(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(ClassData::Separator(d)) = tk.object(id).map(|o| &o.data) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    match d.orientation {
        Orientation::Horizontal => {
            surface.draw_hline(alloc.x, alloc.y, alloc.width, clip, Style::default());
        }
        Orientation::Vertical => {
            for y in alloc.y..alloc.bottom() {
                surface.draw_text(alloc.x, y, "│", clip, Style::default());
            }
        }
    }
}
