//! Test fixtures for common test scenarios.
//!
//! Builds a fake unpacked XZ Utils tree in a temporary directory, and fake
//! toolchain output for either strategy.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::builder::context::BuildContext;
use crate::core::settings::{BuildConfiguration, RawSettings};

/// Visual Studio project content with both runtime tokens.
pub const VCXPROJ: &str = r#"<Project>
  <ItemDefinitionGroup Condition="'$(Configuration)|$(Platform)'=='Debug|x64'">
    <ClCompile>
      <RuntimeLibrary>MultiThreadedDebugDLL</RuntimeLibrary>
    </ClCompile>
  </ItemDefinitionGroup>
  <ItemDefinitionGroup Condition="'$(Configuration)|$(Platform)'=='Release|x64'">
    <ClCompile>
      <RuntimeLibrary>MultiThreadedDLL</RuntimeLibrary>
    </ClCompile>
  </ItemDefinitionGroup>
</Project>
"#;

/// Public headers shipped by liblzma, relative to the API directory.
pub const API_HEADERS: &[&str] = &[
    "lzma.h",
    "lzma/base.h",
    "lzma/container.h",
    "lzma/version.h",
];

/// A fake working directory containing an unpacked `xz-5.2.3` tree.
pub struct SourceTreeFixture {
    tmp: TempDir,
}

impl SourceTreeFixture {
    /// Create the source tree: license, API headers and Windows projects.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let fixture = SourceTreeFixture { tmp };

        let root = fixture.source_root();
        write(&root.join("COPYING"), "XZ Utils Licensing\n");
        for header in API_HEADERS {
            write(&root.join("src/liblzma/api").join(header), "/* api */\n");
        }
        // Private headers must not leak into the package.
        write(&root.join("src/liblzma/common/common.h"), "/* private */\n");

        let windows = root.join("windows");
        write(&windows.join("xz_win.sln"), "Microsoft Visual Studio Solution File\n");
        write(&windows.join("liblzma.vcxproj"), VCXPROJ);
        write(&windows.join("liblzma_dll.vcxproj"), VCXPROJ);

        fixture
    }

    /// The working directory.
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn source_root(&self) -> PathBuf {
        self.tmp.path().join("xz-5.2.3")
    }

    /// A build context rooted at this working directory.
    pub fn context(&self) -> BuildContext {
        BuildContext::new(self.path()).unwrap()
    }

    /// Where the package is collected to.
    pub fn package_dir(&self) -> PathBuf {
        self.tmp.path().join("package")
    }

    /// Fake MSBuild output in `windows/<build_type>/<platform>/<target>`.
    ///
    /// Files may include subdirectories to exercise flattening.
    pub fn msvc_output(&self, build_type: &str, platform: &str, target: &str, files: &[&str]) {
        let dir = self
            .source_root()
            .join("windows")
            .join(build_type)
            .join(platform)
            .join(target);
        for file in files {
            write(&dir.join(file), "binary");
        }
    }

    /// Fake `make install` output under `lzma-install`.
    pub fn install_output(&self, libs: &[&str]) {
        let prefix = self.tmp.path().join("lzma-install");
        for header in API_HEADERS {
            write(&prefix.join("include").join(header), "/* api */\n");
        }
        for lib in libs {
            write(&prefix.join("lib").join(lib), "binary");
        }
        write(&prefix.join("lib/pkgconfig/liblzma.pc"), "Name: liblzma\n");
        write(&prefix.join("lib/liblzma.la"), "# libtool\n");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.tmp.path().join(relative)).unwrap()
    }
}

impl Default for SourceTreeFixture {
    fn default() -> Self {
        SourceTreeFixture::new()
    }
}

/// Parse a profile snippet into a normalized configuration.
pub fn configuration(profile: &str) -> BuildConfiguration {
    let raw: RawSettings = toml::from_str(profile).unwrap();
    BuildConfiguration::from_raw(&raw).unwrap()
}

/// Scenario A: static Linux build with gcc.
pub fn linux_static_release() -> BuildConfiguration {
    configuration(
        r#"
[settings]
os = "Linux"
arch = "x86_64"
compiler = "gcc"
build_type = "Release"

[options]
shared = false
fPIC = true
"#,
    )
}

/// Scenario B: shared Windows debug build with a dynamic debug CRT.
pub fn windows_shared_debug() -> BuildConfiguration {
    configuration(
        r#"
[settings]
os = "Windows"
arch = "x86_64"
compiler = "Visual Studio"
"compiler.runtime" = "MultiThreadedDebugDLL"
build_type = "Debug"

[options]
shared = true
"#,
    )
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
