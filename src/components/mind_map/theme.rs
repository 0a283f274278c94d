//! Visual theming for the mind map.
//!
//! Provides color palettes and the style of the background, links, nodes and
//! per-node controls.

/// Color with 8-bit channels and a float alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::rgba(r, g, b, 1.0)
	}

	/// Color with opacity `a`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Move `amount` of the way toward white.
	pub fn lighten(self, amount: f64) -> Self {
		self.mix(255.0, amount)
	}

	/// Move `amount` of the way toward black.
	pub fn darken(self, amount: f64) -> Self {
		self.mix(0.0, amount)
	}

	fn mix(self, toward: f64, amount: f64) -> Self {
		let t = amount.clamp(0.0, 1.0);
		let channel = |c: u8| (c as f64 + (toward - c as f64) * t) as u8;
		Self {
			r: channel(self.r),
			g: channel(self.g),
			b: channel(self.b),
			a: self.a,
		}
	}

	/// Hex for opaque colors, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if self.a >= 0.999 {
			return format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b);
		}
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// Body colors handed out to nodes in creation order.
#[derive(Clone, Debug)]
pub struct NodePalette(pub Vec<Color>);

impl NodePalette {
	/// Soft greens, blues and ambers on a dark background.
	pub fn meadow() -> Self {
		Self(vec![
			Color::rgb(86, 138, 164),
			Color::rgb(96, 150, 118),
			Color::rgb(176, 138, 84),
			Color::rgb(122, 112, 168),
			Color::rgb(160, 98, 112),
			Color::rgb(82, 146, 142),
		])
	}

	/// Cooler, lower-contrast set for the midnight theme.
	pub fn dusk() -> Self {
		Self(vec![
			Color::rgb(88, 112, 150),
			Color::rgb(110, 96, 146),
			Color::rgb(78, 130, 130),
			Color::rgb(140, 104, 134),
			Color::rgb(96, 124, 112),
		])
	}

	/// Color for palette slot `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		self.0[index % self.0.len()]
	}
}

/// Canvas backdrop.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Edge color, and the whole fill without a gradient.
	pub color: Color,
	/// Center color of the radial gradient.
	pub color_secondary: Color,
	/// Fill with a radial gradient instead of a flat color.
	pub use_gradient: bool,
}

/// Connection visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Line color.
	pub color: Color,
	/// Sideways bend of each curve relative to its length (0.0 = straight).
	pub curve_tension: f64,
}

/// Node body and label style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether bodies have a radial gradient
	pub use_gradient: bool,
	/// Label text color.
	pub label_color: Color,
	/// Outline drawn around pinned (dragged) nodes
	pub pinned_border: Color,
	/// Outline drawn around the hovered node
	pub hover_border: Color,
	/// Outline width in screen pixels.
	pub border_width: f64,
}

/// Fill colors of the add/edit/remove buttons.
#[derive(Clone, Debug)]
pub struct ControlStyle {
	/// Add-child button.
	pub add: Color,
	/// Edit button.
	pub edit: Color,
	/// Remove button.
	pub remove: Color,
	/// Button symbol color.
	pub glyph: Color,
}

/// Everything the renderer needs to pick a color.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name used to select the theme in configuration.
	pub name: &'static str,
	/// Canvas backdrop.
	pub background: BackgroundStyle,
	/// Connection lines.
	pub edge: EdgeStyle,
	/// Node bodies and labels.
	pub node: NodeStyle,
	/// Per-node buttons.
	pub control: ControlStyle,
	/// Node body colors.
	pub palette: NodePalette,
}

impl Theme {
	/// Dark slate backdrop with a colorful palette.
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(24, 28, 36),
				color_secondary: Color::rgb(36, 42, 52),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.6),
				curve_tension: 0.15,
			},
			node: NodeStyle {
				use_gradient: true,
				label_color: Color::rgba(255, 255, 255, 0.92),
				pinned_border: Color::rgba(255, 214, 120, 0.9),
				hover_border: Color::rgba(255, 255, 255, 0.8),
				border_width: 2.0,
			},
			control: ControlStyle {
				add: Color::rgb(76, 154, 106),
				edit: Color::rgb(84, 130, 190),
				remove: Color::rgb(190, 86, 86),
				glyph: Color::rgb(245, 245, 245),
			},
			palette: NodePalette::meadow(),
		}
	}

	/// Near-black backdrop with muted colors.
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(12, 13, 20),
				color_secondary: Color::rgb(22, 24, 36),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(100, 120, 150, 0.55),
				curve_tension: 0.2,
			},
			node: NodeStyle {
				use_gradient: true,
				label_color: Color::rgba(235, 235, 245, 0.9),
				pinned_border: Color::rgba(200, 170, 255, 0.9),
				hover_border: Color::rgba(220, 220, 255, 0.8),
				border_width: 2.0,
			},
			control: ControlStyle {
				add: Color::rgb(70, 140, 120),
				edit: Color::rgb(100, 110, 170),
				remove: Color::rgb(170, 80, 110),
				glyph: Color::rgb(235, 235, 245),
			},
			palette: NodePalette::dusk(),
		}
	}

	/// Look up a built-in theme by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"midnight" => Self::midnight(),
			"default" => Self::default_theme(),
			other => {
				log::warn!("mind-map: unknown theme `{}`, using default", other);
				Self::default_theme()
			}
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Theme::by_name("default")
	}
}
