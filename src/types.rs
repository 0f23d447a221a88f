//! Value types describing one installation check.

use std::{fmt::Display, str::FromStr};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Osx,
    Tvos,
    Watchos,
    Visionos,
    Catalyst,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Ios,
        Platform::Osx,
        Platform::Tvos,
        Platform::Watchos,
        Platform::Visionos,
        Platform::Catalyst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Osx => "osx",
            Platform::Tvos => "tvos",
            Platform::Watchos => "watchos",
            Platform::Visionos => "visionos",
            Platform::Catalyst => "catalyst",
        }
    }

    /// Platform name understood by `carthage update --platform`.
    pub fn carthage_name(&self) -> Option<&'static str> {
        match self {
            Platform::Ios => Some("iOS"),
            Platform::Osx => Some("Mac"),
            Platform::Tvos => Some("tvOS"),
            Platform::Watchos => Some("watchOS"),
            Platform::Visionos | Platform::Catalyst => None,
        }
    }

    /// SDK and destination passed to `xcodebuild archive`. Catalyst builds
    /// against the macOS SDK selected by the destination variant. visionOS
    /// takes neither and lets the project settings decide.
    pub fn sdk_and_destination(&self) -> Option<(Option<&'static str>, &'static str)> {
        match self {
            Platform::Ios => Some((Some("iphoneos"), "generic/platform=iphoneos")),
            Platform::Tvos => Some((Some("appletvos"), "generic/platform=appletvos")),
            Platform::Watchos => Some((Some("watchos"), "generic/platform=watchos")),
            Platform::Osx => Some((Some("macosx"), "generic/platform=macOS")),
            Platform::Catalyst => Some((None, "generic/platform=macOS,variant=Mac Catalyst")),
            Platform::Visionos => None,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::Usage(format!("unknown platform '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Cocoapods,
    Carthage,
    Spm,
    Xcframework,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Cocoapods,
        Method::Carthage,
        Method::Spm,
        Method::Xcframework,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Cocoapods => "cocoapods",
            Method::Carthage => "carthage",
            Method::Spm => "spm",
            Method::Xcframework => "xcframework",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::Usage(format!("unknown method '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Linkage {
    Static,
    #[default]
    Dynamic,
}

impl Linkage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Linkage::Static => "static",
            Linkage::Dynamic => "dynamic",
        }
    }
}

impl Display for Linkage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Linkage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Linkage::Static),
            "dynamic" => Ok(Linkage::Dynamic),
            _ => Err(Error::Usage(format!("unknown linkage '{s}'"))),
        }
    }
}

/// Flavour of the prebuilt release package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Swift,
    Objc,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Swift => "swift",
            Language::Objc => "objc",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (platform, method, linkage) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Case {
    pub platform: Platform,
    pub method: Method,
    pub linkage: Linkage,
}

impl Case {
    pub fn new(platform: Platform, method: Method, linkage: Linkage) -> Self {
        Case {
            platform,
            method,
            linkage,
        }
    }

    /// SwiftPM links the package statically because the example has a single
    /// target, so spm runs always expect a static product.
    pub fn is_static(&self) -> bool {
        self.linkage == Linkage::Static || self.method == Method::Spm
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.platform, self.method, self.linkage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    TestAll,
    Single(Case),
}

impl Invocation {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Invocation, Error> {
        let args = args.iter().map(|x| x.as_ref()).collect::<Vec<_>>();
        match args.as_slice() {
            [] => Err(Error::Usage("missing arguments".into())),
            ["test-all"] => Ok(Invocation::TestAll),
            [platform, method] => Ok(Invocation::Single(Case::new(
                platform.parse()?,
                method.parse()?,
                Linkage::default(),
            ))),
            [platform, method, linkage] => Ok(Invocation::Single(Case::new(
                platform.parse()?,
                method.parse()?,
                linkage.parse()?,
            ))),
            _ => Err(Error::Usage(format!(
                "unexpected arguments: {}",
                args.join(" ")
            ))),
        }
    }
}
