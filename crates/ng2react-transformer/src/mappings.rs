//! Naming tables for translating Angular template markup into React TSX.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

/// React synthetic event names without the `on` prefix. Angular writes
/// events in lowercase (`keydown`), React as `onKeyDown`.
const EVENT_NAMES: &[&str] = &[
    "Copy",
    "Cut",
    "Paste",
    "CompositionEnd",
    "CompositionStart",
    "CompositionUpdate",
    "KeyDown",
    "KeyPress",
    "KeyUp",
    "Focus",
    "Blur",
    "Change",
    "Input",
    "Invalid",
    "Reset",
    "Submit",
    "Error",
    "Load",
    "Click",
    "ContextMenu",
    "DoubleClick",
    "Drag",
    "DragEnd",
    "DragEnter",
    "DragExit",
    "DragLeave",
    "DragOver",
    "DragStart",
    "Drop",
    "MouseDown",
    "MouseEnter",
    "MouseLeave",
    "MouseMove",
    "MouseOut",
    "MouseOver",
    "MouseUp",
    "PointerDown",
    "PointerMove",
    "PointerUp",
    "PointerCancel",
    "GotPointerCapture",
    "LostPointerCapture",
    "PointerEnter",
    "PointerLeave",
    "PointerOver",
    "PointerOut",
    "Select",
    "TouchCancel",
    "TouchEnd",
    "TouchMove",
    "TouchStart",
    "Scroll",
    "Wheel",
    "Abort",
    "CanPlay",
    "CanPlayThrough",
    "DurationChange",
    "Emptied",
    "Encrypted",
    "Ended",
    "LoadedData",
    "LoadedMetadata",
    "LoadStart",
    "Pause",
    "Play",
    "Playing",
    "Progress",
    "RateChange",
    "Seeked",
    "Seeking",
    "Stalled",
    "Suspend",
    "TimeUpdate",
    "VolumeChange",
    "Waiting",
    "AnimationStart",
    "AnimationEnd",
    "AnimationIteration",
    "TransitionEnd",
    "Toggle",
];

/// Angular event name → React event prop, e.g. `keydown` → `onKeyDown`.
pub static EVENT_NAME_MAP: Lazy<FxHashMap<String, String>> = Lazy::new(|| {
    let mut map: FxHashMap<String, String> = EVENT_NAMES
        .iter()
        .map(|name| (name.to_ascii_lowercase(), format!("on{name}")))
        .collect();
    // The DOM spells it `dblclick`.
    map.insert("dblclick".to_string(), "onDoubleClick".to_string());
    map
});

/// Elements that never have content and must be self-closed in TSX.
pub static VOID_ELEMENTS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

/// Attribute names React spells differently. `class` is handled separately.
pub static ATTRIBUTE_DOM_ALIASES: Lazy<FxHashMap<&'static str, &'static str>> =
    Lazy::new(|| [("for", "htmlFor")].into_iter().collect());

/// React attribute names whose spelling is not all lowercase.
const CAMEL_CASE_ATTRIBUTES: &[&str] = &[
    // HTML
    "acceptCharset",
    "accessKey",
    "allowFullScreen",
    "autoComplete",
    "autoFocus",
    "autoPlay",
    "cellPadding",
    "cellSpacing",
    "charSet",
    "classID",
    "className",
    "colSpan",
    "contentEditable",
    "contextMenu",
    "controlsList",
    "crossOrigin",
    "dateTime",
    "encType",
    "formAction",
    "formEncType",
    "formMethod",
    "formNoValidate",
    "formTarget",
    "frameBorder",
    "hrefLang",
    "htmlFor",
    "httpEquiv",
    "inputMode",
    "keyParams",
    "keyType",
    "marginHeight",
    "marginWidth",
    "maxLength",
    "mediaGroup",
    "minLength",
    "noValidate",
    "radioGroup",
    "readOnly",
    "rowSpan",
    "spellCheck",
    "srcDoc",
    "srcLang",
    "srcSet",
    "tabIndex",
    "useMap",
    // SVG
    "accentHeight",
    "alignmentBaseline",
    "allowReorder",
    "arabicForm",
    "attributeName",
    "attributeType",
    "autoReverse",
    "baseFrequency",
    "baseProfile",
    "baselineShift",
    "calcMode",
    "capHeight",
    "clipPath",
    "clipPathUnits",
    "clipRule",
    "colorInterpolation",
    "colorInterpolationFilters",
    "colorProfile",
    "colorRendering",
    "contentScriptType",
    "contentStyleType",
    "diffuseConstant",
    "dominantBaseline",
    "edgeMode",
    "enableBackground",
    "externalResourcesRequired",
    "fillOpacity",
    "fillRule",
    "filterRes",
    "filterUnits",
    "floodColor",
    "floodOpacity",
    "fontFamily",
    "fontSize",
    "fontSizeAdjust",
    "fontStretch",
    "fontStyle",
    "fontVariant",
    "fontWeight",
    "glyphName",
    "glyphOrientationHorizontal",
    "glyphOrientationVertical",
    "glyphRef",
    "gradientTransform",
    "gradientUnits",
    "horizAdvX",
    "horizOriginX",
    "imageRendering",
    "kernelMatrix",
    "kernelUnitLength",
    "keyPoints",
    "keySplines",
    "keyTimes",
    "lengthAdjust",
    "letterSpacing",
    "lightingColor",
    "limitingConeAngle",
    "markerEnd",
    "markerHeight",
    "markerMid",
    "markerStart",
    "markerUnits",
    "markerWidth",
    "maskContentUnits",
    "maskUnits",
    "numOctaves",
    "overlinePosition",
    "overlineThickness",
    "paintOrder",
    "pathLength",
    "patternContentUnits",
    "patternTransform",
    "patternUnits",
    "pointerEvents",
    "pointsAtX",
    "pointsAtY",
    "pointsAtZ",
    "preserveAlpha",
    "preserveAspectRatio",
    "primitiveUnits",
    "refX",
    "refY",
    "renderingIntent",
    "repeatCount",
    "repeatDur",
    "requiredExtensions",
    "requiredFeatures",
    "shapeRendering",
    "specularConstant",
    "specularExponent",
    "spreadMethod",
    "startOffset",
    "stdDeviation",
    "stitchTiles",
    "stopColor",
    "stopOpacity",
    "strikethroughPosition",
    "strikethroughThickness",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeLinecap",
    "strokeLinejoin",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
    "surfaceScale",
    "systemLanguage",
    "tableValues",
    "targetX",
    "targetY",
    "textAnchor",
    "textDecoration",
    "textLength",
    "textRendering",
    "underlinePosition",
    "underlineThickness",
    "unicodeBidi",
    "unicodeRange",
    "unitsPerEm",
    "vAlphabetic",
    "vHanging",
    "vIdeographic",
    "vMathematical",
    "vectorEffect",
    "vertAdvY",
    "vertOriginX",
    "vertOriginY",
    "viewBox",
    "viewTarget",
    "wordSpacing",
    "writingMode",
    "xChannelSelector",
    "xHeight",
    "xlinkActuate",
    "xlinkArcrole",
    "xlinkHref",
    "xlinkRole",
    "xlinkShow",
    "xlinkTitle",
    "xlinkType",
    "xmlnsXlink",
    "xmlBase",
    "xmlLang",
    "xmlSpace",
    "yChannelSelector",
    "zoomAndPan",
];

/// Lowercase attribute name → React spelling, e.g. `colspan` → `colSpan`.
pub static CASE_MAP: Lazy<FxHashMap<String, &'static str>> = Lazy::new(|| {
    CAMEL_CASE_ATTRIBUTES
        .iter()
        .map(|name| (name.to_ascii_lowercase(), *name))
        .collect()
});

/// React props that take numbers rather than strings.
pub static NON_STRING_ATTRIBUTES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    ["size", "colSpan", "tabIndex", "minLength", "maxLength"]
        .into_iter()
        .collect()
});

/// Returns the React event prop for an Angular event name, if known.
pub fn react_event_name(angular_name: &str) -> Option<&'static str> {
    EVENT_NAME_MAP.get(angular_name).map(String::as_str)
}

/// True for elements that must be written `<tag />`.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(tag)
}
