use crate::{
    archive::validate_build,
    cmd::{Cmd, Runner},
    config::{Layout, Settings, BUILD_STATIC_VAR},
    error::Error,
    net::Network,
    types::{Case, Invocation, Linkage, Method, Platform},
};

/// Runs installation checks against the example projects.
pub struct Driver<R, N> {
    pub(crate) runner: R,
    pub(crate) network: N,
    pub(crate) layout: Layout,
    pub(crate) settings: Settings,
}

/// Every combination `test-all` runs, in order. visionOS is only available
/// with Xcode 15.
pub fn matrix(xcode_major: Option<u32>) -> Vec<Case> {
    let mut platforms = vec![
        Platform::Ios,
        Platform::Osx,
        Platform::Tvos,
        Platform::Watchos,
        Platform::Catalyst,
    ];
    if xcode_major == Some(15) {
        platforms.push(Platform::Visionos);
    }

    let mut cases = vec![];
    for platform in platforms {
        for method in Method::ALL {
            if platform == Platform::Catalyst && method == Method::Carthage {
                continue;
            }
            if platform == Platform::Visionos && method != Method::Spm {
                continue;
            }
            cases.push(Case::new(platform, method, Linkage::Dynamic));
        }

        if platform != Platform::Visionos {
            cases.push(Case::new(platform, Method::Cocoapods, Linkage::Static));
        }
    }
    cases.push(Case::new(Platform::Ios, Method::Xcframework, Linkage::Static));
    cases
}

impl<R: Runner, N: Network> Driver<R, N> {
    pub fn new(runner: R, network: N, layout: Layout, settings: Settings) -> Self {
        Driver {
            runner,
            network,
            layout,
            settings,
        }
    }

    /// A command run from the example directory with the resolved settings
    /// and the static flag for `case` in its environment.
    pub(crate) fn command(&self, program: impl Into<String>, case: &Case) -> Cmd {
        let cmd = Cmd::new(program)
            .current_dir(&self.layout.example_dir)
            .envs(&self.settings.child_env());
        if case.is_static() {
            cmd.env(BUILD_STATIC_VAR, "1")
        } else {
            cmd.env_remove(BUILD_STATIC_VAR)
        }
    }

    pub async fn run(&self, invocation: Invocation) -> Result<(), Error> {
        match invocation {
            Invocation::TestAll => self.test_all().await,
            Invocation::Single(case) => self.test(case).await,
        }
    }

    /// Fetch, build and validate a single combination.
    pub async fn test(&self, case: Case) -> Result<(), Error> {
        log::info!("Testing {} for {}", case.method, case.platform);

        self.fetch(&case).await?;
        self.build_app(&case)?;
        validate_build(&self.layout.archive_path(), case.is_static())
    }

    /// Stops at the first failing combination.
    pub async fn test_all(&self) -> Result<(), Error> {
        let cases = matrix(self.settings.xcode_major());
        log::info!("Running {} combinations", cases.len());
        for case in cases {
            self.test(case).await?;
        }
        Ok(())
    }
}
