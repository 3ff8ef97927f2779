//! Standalone SVG export of a live rendering.

use std::cell::OnceCell;
use std::rc::Rc;

use log::{debug, info};

use super::error::ExportError;
use super::render::SVG_NS;
use super::types::ContainerSize;

/// Embedded so exported files do not depend on the hosting page's fonts.
pub const SVG_STYLING: &str = "<style>\ntext{font-family:sans-serif}\n</style>";

/// Download paths the host platform offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportCapability {
	/// Blob + `URL.createObjectURL` are available.
	pub blob_url: bool,
	/// A legacy "save blob" call (`navigator.msSaveOrOpenBlob`) is available.
	pub legacy_save: bool,
}

impl ExportCapability {
	pub fn is_available(&self) -> bool {
		self.blob_url || self.legacy_save
	}
}

/// A rendered root element that can be turned back into markup.
pub trait SvgSource {
	fn has_native_serializer(&self) -> bool;
	/// Full markup, root element included.
	fn serialize_native(&self) -> Result<String, ExportError>;
	/// Markup of the root element's children only.
	fn inner_markup(&self) -> Result<String, ExportError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializerStrategy {
	Native,
	InnerMarkup,
}

impl SerializerStrategy {
	pub fn for_source(source: &dyn SvgSource) -> Self {
		if source.has_native_serializer() {
			SerializerStrategy::Native
		} else {
			SerializerStrategy::InnerMarkup
		}
	}

	pub fn serialize(self, source: &dyn SvgSource) -> Result<String, ExportError> {
		match self {
			SerializerStrategy::Native => source.serialize_native(),
			SerializerStrategy::InnerMarkup => {
				Ok(format!("<svg xmlns=\"{SVG_NS}\">{}</svg>", source.inner_markup()?))
			}
		}
	}
}

/// Pin the size on the root tag and embed the font rule before the first group.
pub fn standalone_svg(markup: &str, size: ContainerSize) -> Result<String, ExportError> {
	let root = markup
		.find("<svg")
		.ok_or_else(|| ExportError::Serialize("no <svg> root in serialized markup".into()))?;
	let at = root + "<svg".len();
	let mut out = String::with_capacity(markup.len() + SVG_STYLING.len() + 48);
	out.push_str(&markup[..at]);
	out.push_str(&format!(" height=\"{}\" width=\"{}\"", size.height, size.width));
	out.push_str(&markup[at..]);
	Ok(out.replacen("<g", &format!("\n{SVG_STYLING}\n<g"), 1))
}

/// Host calls that actually hand a file to the user.
pub trait ExportPlatform {
	fn save_blob(&self, svg: &str, file_name: &str) -> Result<(), ExportError>;
	fn create_object_url(&self, svg: &str) -> Result<String, ExportError>;
	fn revoke_object_url(&self, url: &str);
}

/// State of the one-shot download control.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadLink {
	pub href: Option<String>,
	pub file_name: String,
	pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
	/// Handed to the legacy save call.
	Saved { file_name: String },
	/// A download link is showing and waits for the user.
	LinkReady { href: String, file_name: String },
}

pub struct Exporter {
	id: String,
	capability: ExportCapability,
	platform: Rc<dyn ExportPlatform>,
	strategy: OnceCell<SerializerStrategy>,
	link: DownloadLink,
}

impl Exporter {
	pub fn new(id: &str, capability: ExportCapability, platform: Rc<dyn ExportPlatform>) -> Self {
		Self {
			id: id.to_string(),
			capability,
			platform,
			strategy: OnceCell::new(),
			link: DownloadLink::default(),
		}
	}

	pub fn is_available(&self) -> bool {
		self.capability.is_available()
	}

	pub fn file_name(&self) -> String {
		format!("{}.svg", self.id)
	}

	pub fn link(&self) -> &DownloadLink {
		&self.link
	}

	/// The download control hides itself once used.
	pub fn link_clicked(&mut self) {
		self.link.visible = false;
	}

	pub fn export(&mut self, source: &dyn SvgSource, size: ContainerSize) -> Result<ExportOutcome, ExportError> {
		if !self.is_available() {
			return Err(ExportError::Unavailable);
		}
		let strategy = *self.strategy.get_or_init(|| SerializerStrategy::for_source(source));
		debug!("serializing {} with {strategy:?}", self.id);
		let svg = standalone_svg(&strategy.serialize(source)?, size)?;
		let file_name = self.file_name();

		if self.capability.legacy_save {
			self.platform.save_blob(&svg, &file_name)?;
			info!("saved {file_name}");
			return Ok(ExportOutcome::Saved { file_name });
		}

		if let Some(previous) = self.link.href.take() {
			self.platform.revoke_object_url(&previous);
		}
		let href = self.platform.create_object_url(&svg)?;
		self.link = DownloadLink {
			href: Some(href.clone()),
			file_name: file_name.clone(),
			visible: true,
		};
		info!("download link ready for {file_name}");
		Ok(ExportOutcome::LinkReady { href, file_name })
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;

	#[derive(Default)]
	struct RecordingPlatform {
		calls: RefCell<Vec<String>>,
		saved: RefCell<Vec<String>>,
	}

	impl ExportPlatform for RecordingPlatform {
		fn save_blob(&self, svg: &str, file_name: &str) -> Result<(), ExportError> {
			self.calls.borrow_mut().push(format!("save {file_name}"));
			self.saved.borrow_mut().push(svg.to_string());
			Ok(())
		}

		fn create_object_url(&self, svg: &str) -> Result<String, ExportError> {
			let n = self.calls.borrow().len();
			self.calls.borrow_mut().push(format!("create blob:{n}"));
			self.saved.borrow_mut().push(svg.to_string());
			Ok(format!("blob:{n}"))
		}

		fn revoke_object_url(&self, url: &str) {
			self.calls.borrow_mut().push(format!("revoke {url}"));
		}
	}

	struct Markup {
		native: bool,
		svg: &'static str,
	}

	impl SvgSource for Markup {
		fn has_native_serializer(&self) -> bool {
			self.native
		}

		fn serialize_native(&self) -> Result<String, ExportError> {
			Ok(self.svg.to_string())
		}

		fn inner_markup(&self) -> Result<String, ExportError> {
			let start = self.svg.find('>').unwrap() + 1;
			Ok(self.svg[start..self.svg.len() - "</svg>".len()].to_string())
		}
	}

	struct Broken;

	impl SvgSource for Broken {
		fn has_native_serializer(&self) -> bool {
			true
		}

		fn serialize_native(&self) -> Result<String, ExportError> {
			Err(ExportError::Serialize("detached element".into()))
		}

		fn inner_markup(&self) -> Result<String, ExportError> {
			Err(ExportError::Serialize("detached element".into()))
		}
	}

	const LIVE: Markup = Markup {
		native: true,
		svg: "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"graph-view\"><g class=\"layer\"><g/></g></svg>",
	};

	fn blob_only() -> ExportCapability {
		ExportCapability { blob_url: true, legacy_save: false }
	}

	#[test]
	fn standalone_svg_is_sized_and_styled() {
		let svg = standalone_svg(LIVE.svg, ContainerSize::new(400.0, 300.0)).unwrap();
		assert!(svg.starts_with("<svg height=\"300\" width=\"400\" xmlns="));
		assert_eq!(svg.matches(SVG_STYLING).count(), 1);
		assert!(svg.contains(&format!("{SVG_STYLING}\n<g class=\"layer\">")));
	}

	#[test]
	fn both_serializers_produce_a_root() {
		let fallback = Markup { native: false, ..LIVE };
		let native = SerializerStrategy::for_source(&LIVE).serialize(&LIVE).unwrap();
		let wrapped = SerializerStrategy::for_source(&fallback).serialize(&fallback).unwrap();
		assert_eq!(SerializerStrategy::for_source(&fallback), SerializerStrategy::InnerMarkup);
		assert_eq!(wrapped, format!("<svg xmlns=\"{SVG_NS}\"><g class=\"layer\"><g/></g></svg>"));
		for svg in [native, wrapped] {
			let out = standalone_svg(&svg, ContainerSize::new(10.0, 20.0)).unwrap();
			assert!(out.starts_with("<svg height=\"20\" width=\"10\""));
			assert!(out.ends_with("</svg>"));
		}
	}

	#[test]
	fn repeated_exports_revoke_the_previous_url() {
		let platform = Rc::new(RecordingPlatform::default());
		let mut exporter = Exporter::new("gist", blob_only(), platform.clone());
		let size = ContainerSize::new(400.0, 300.0);

		let first = exporter.export(&LIVE, size).unwrap();
		exporter.link_clicked();
		assert!(!exporter.link().visible);
		let second = exporter.export(&LIVE, size).unwrap();

		assert_eq!(
			first,
			ExportOutcome::LinkReady { href: "blob:0".into(), file_name: "gist.svg".into() }
		);
		assert_eq!(
			*platform.calls.borrow(),
			vec!["create blob:0", "revoke blob:0", "create blob:2"]
		);
		assert!(matches!(second, ExportOutcome::LinkReady { ref href, .. } if href == "blob:2"));
		assert!(exporter.link().visible);
	}

	#[test]
	fn legacy_save_gets_the_bytes_directly() {
		let platform = Rc::new(RecordingPlatform::default());
		let capability = ExportCapability { blob_url: true, legacy_save: true };
		let mut exporter = Exporter::new("gist", capability, platform.clone());

		let outcome = exporter.export(&LIVE, ContainerSize::new(400.0, 300.0)).unwrap();
		assert_eq!(outcome, ExportOutcome::Saved { file_name: "gist.svg".into() });
		assert_eq!(*platform.calls.borrow(), vec!["save gist.svg"]);
		assert!(platform.saved.borrow()[0].contains("width=\"400\""));
		assert_eq!(exporter.link(), &DownloadLink::default());
	}

	#[test]
	fn failures_propagate() {
		let platform = Rc::new(RecordingPlatform::default());
		let mut exporter = Exporter::new("gist", blob_only(), platform.clone());
		let err = exporter.export(&Broken, ContainerSize::new(1.0, 1.0)).unwrap_err();
		assert!(matches!(err, ExportError::Serialize(_)));
		assert!(platform.calls.borrow().is_empty());

		let mut none = Exporter::new("gist", ExportCapability::default(), platform);
		assert!(!none.is_available());
		assert!(matches!(
			none.export(&LIVE, ContainerSize::new(1.0, 1.0)),
			Err(ExportError::Unavailable)
		));
	}
}
