//! The project kinds the scaffolder knows how to generate.

use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

use crate::errors::StarlessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    TypescriptExpressLambda,
    StarlessApp,
    CommandLineApp,
}

/// One line of the success banner: an npm command and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerCommand {
    pub command: &'static str,
    pub description: &'static str,
}

const DEV: BannerCommand = BannerCommand {
    command: "npm run dev  ",
    description: "Starts the development server with hot reload.",
};
const BUNDLE: BannerCommand = BannerCommand {
    command: "npm run build",
    description: "Bundles the app for aws lambda and azure function.",
};
const SERVE: BannerCommand = BannerCommand {
    command: "npm start    ",
    description: "Starts the server.",
};

const SERVER_BANNER: [BannerCommand; 3] = [DEV, BUNDLE, SERVE];
const APP_BANNER: [BannerCommand; 4] = [
    BannerCommand {
        command: "npm run watch",
        description: "Compiles typescript on files change.",
    },
    DEV,
    BUNDLE,
    SERVE,
];
const CLI_BANNER: [BannerCommand; 4] = [
    BannerCommand {
        command: "npm run build",
        description: "Compiles typescript.",
    },
    BannerCommand {
        command: "npm run test  ",
        description: "Unit Test with jest.",
    },
    BannerCommand {
        command: "npm run release",
        description: "Publish to npm.",
    },
    BannerCommand {
        command: "npm start    ",
        description: "Run App.",
    },
];

impl ProjectKind {
    pub const ALL: [Self; 3] = [
        Self::TypescriptExpressLambda,
        Self::StarlessApp,
        Self::CommandLineApp,
    ];

    /// Directory name under the templates directory, also the CLI choice.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TypescriptExpressLambda => "typescript-express-lambda",
            Self::StarlessApp => "starless-app",
            Self::CommandLineApp => "command-line-app",
        }
    }

    #[must_use]
    pub fn tsconfig(self) -> Value {
        match self {
            Self::TypescriptExpressLambda => server_tsconfig("./dist"),
            Self::StarlessApp => server_tsconfig("./"),
            Self::CommandLineApp => json!({
                "compilerOptions": {
                    "target": "es6",
                    "module": "commonjs",
                    "declaration": true,
                    "outDir": "./",
                    "strict": false,
                    "esModuleInterop": true,
                    "removeComments": true
                },
                "include": ["src"],
                "exclude": ["node_modules", "**/__tests__/*", "test"]
            }),
        }
    }

    /// Files copied next to `src` from the project template.
    #[must_use]
    pub const fn extra_files(self) -> &'static [&'static str] {
        match self {
            Self::TypescriptExpressLambda | Self::StarlessApp => &["docker-compose.yml", "Dockerfile"],
            Self::CommandLineApp => &[],
        }
    }

    /// Arguments to `npm` for the dev dependency install.
    #[must_use]
    pub const fn install_args(self) -> &'static [&'static str] {
        match self {
            Self::TypescriptExpressLambda => &[
                "i",
                "-D",
                "@types/aws-lambda",
                "@types/cors",
                "@types/express",
                "@types/node",
                "@azure/functions",
                "cors",
                "dotenv",
                "express",
                "nodemon",
                "ts-node",
                "typescript",
            ],
            Self::StarlessApp => &[
                "i",
                "-D",
                "@types/aws-lambda",
                "@types/node",
                "@azure/functions",
                "@types/express",
                "typescript",
                "nodemon",
                "starless-server",
                "jest",
                "@types/jest",
                "ts-jest",
            ],
            Self::CommandLineApp => &[
                "i",
                "-D",
                "@types/node",
                "typescript",
                "jest",
                "@types/jest",
                "ts-jest",
            ],
        }
    }

    /// Command run after the install, as `(program, args)`.
    #[must_use]
    pub const fn post_install(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Self::TypescriptExpressLambda => None,
            Self::StarlessApp | Self::CommandLineApp => Some(("npx", &["ts-jest", "config:init"])),
        }
    }

    /// The `scripts` block written into `package.json`.
    #[must_use]
    pub fn scripts(self) -> Value {
        match self {
            Self::TypescriptExpressLambda => json!({
                "start": "ts-node src/index.ts",
                "dev": "nodemon src/index.ts",
                "build": "tsc && starless build"
            }),
            Self::StarlessApp => json!({
                "start": "tsc && starless-server start",
                "watch": "tsc -w",
                "dev": "nodemon node_modules/starless-server start",
                "build": "tsc && starless-server build --azure-functions --aws-sam-lambda",
                "test": "jest --verbose"
            }),
            Self::CommandLineApp => json!({
                "build": "tsc",
                "start": "node .",
                "test": "jest --verbose",
                "release": "tsc && npm publish"
            }),
        }
    }

    #[must_use]
    pub const fn bin(self) -> Option<&'static str> {
        match self {
            Self::CommandLineApp => Some("./index.js"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn dockerignore(self) -> Option<&'static str> {
        match self {
            Self::TypescriptExpressLambda => {
                Some(".git\n.gitignore\nnode_modules\ndist\n.env\nazure_function")
            }
            Self::StarlessApp => Some(
                ".git\n.gitignore\nnode_modules\ndist\n.env\nazure_functions\naws_lambda\n*.ts",
            ),
            Self::CommandLineApp => None,
        }
    }

    #[must_use]
    pub const fn gitignore(self) -> &'static str {
        match self {
            Self::TypescriptExpressLambda => "node_modules\ndist\n.env\nazure_function",
            Self::StarlessApp => {
                "node_modules\ndist\n.env\nazure_functions\naws_lambda\n*.js\n*.js.map\n!jest.config.js"
            }
            Self::CommandLineApp => "node_modules",
        }
    }

    #[must_use]
    pub const fn banner(self) -> &'static [BannerCommand] {
        match self {
            Self::TypescriptExpressLambda => &SERVER_BANNER,
            Self::StarlessApp => &APP_BANNER,
            Self::CommandLineApp => &CLI_BANNER,
        }
    }
}

fn server_tsconfig(out_dir: &str) -> Value {
    json!({
        "compilerOptions": {
            "module": "CommonJS",
            "target": "esnext",
            "noImplicitAny": true,
            "preserveConstEnums": true,
            "outDir": out_dir,
            "sourceMap": true,
            "rootDir": "./src",
            "esModuleInterop": true,
            "removeComments": true,
            "resolveJsonModule": true
        },
        "include": ["src/**/*"],
        "exclude": ["node_modules", "**/*.spec.ts"]
    })
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectKind {
    type Err = StarlessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StarlessError::UnknownProject(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_names() {
        for kind in ProjectKind::ALL {
            assert_eq!(kind.name().parse::<ProjectKind>().unwrap(), kind);
        }
        assert_eq!(
            " Starless-App ".parse::<ProjectKind>().unwrap(),
            ProjectKind::StarlessApp
        );
        assert!(matches!(
            "node-express".parse::<ProjectKind>(),
            Err(StarlessError::UnknownProject(name)) if name == "node-express"
        ));
    }

    #[test]
    fn test_tsconfig_out_dirs() {
        assert_eq!(
            ProjectKind::TypescriptExpressLambda.tsconfig()["compilerOptions"]["outDir"],
            "./dist"
        );
        assert_eq!(ProjectKind::StarlessApp.tsconfig()["compilerOptions"]["outDir"], "./");
        let cli = ProjectKind::CommandLineApp.tsconfig();
        assert_eq!(cli["compilerOptions"]["target"], "es6");
        assert_eq!(cli["compilerOptions"]["declaration"], true);
        assert_eq!(cli["include"], json!(["src"]));
    }

    #[test]
    fn test_only_jest_projects_init_ts_jest() {
        assert!(ProjectKind::TypescriptExpressLambda.post_install().is_none());
        let (program, args) = ProjectKind::StarlessApp.post_install().unwrap();
        assert_eq!(program, "npx");
        assert_eq!(args, ["ts-jest", "config:init"]);
        assert_eq!(ProjectKind::CommandLineApp.scripts()["test"], "jest --verbose");
    }

    #[test]
    fn test_cli_project_has_bin_and_no_dockerignore() {
        assert_eq!(ProjectKind::CommandLineApp.bin(), Some("./index.js"));
        assert!(ProjectKind::CommandLineApp.dockerignore().is_none());
        assert!(ProjectKind::CommandLineApp.extra_files().is_empty());
        assert_eq!(ProjectKind::CommandLineApp.gitignore(), "node_modules");
    }

    #[test]
    fn test_banner_commands_per_project() {
        let server = ProjectKind::TypescriptExpressLambda.banner();
        assert_eq!(server.len(), 3);
        assert_eq!(server[0].command.trim(), "npm run dev");

        let app = ProjectKind::StarlessApp.banner();
        assert_eq!(app.len(), 4);
        assert_eq!(app[0].command, "npm run watch");
        assert_eq!(&app[1..], server);

        let cli = ProjectKind::CommandLineApp.banner();
        assert_eq!(cli[2].description, "Publish to npm.");
        assert_eq!(cli[3].description, "Run App.");
    }
}
