// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::blob::Blob;
use crate::config::ModuleConfig;
use crate::errors::Result;
use crate::traits::{Flow, Module};

/// Prints every blob it receives and passes it on unchanged.
#[derive(Debug, Clone, Default)]
pub struct BlobPrinter {
    prefix: String,
    printed: usize,
}

impl BlobPrinter {
    pub fn render(&self, blob: &Blob) -> String {
        format!("{}{}", self.prefix, blob)
    }
}

impl Module for BlobPrinter {
    fn configure(&mut self, config: &mut ModuleConfig) -> Result<()> {
        self.prefix = config.get_or("prefix", String::new())?;
        Ok(())
    }

    fn process(&mut self, blob: Blob) -> Result<Flow> {
        println!("{}", self.render(&blob));
        self.printed += 1;
        Ok(Flow::Continue(blob))
    }

    fn finish(&mut self) -> Result<Blob> {
        Ok(Blob::from_iter([("printed", self.printed)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameters;
    use crate::services::ServiceRegistry;

    #[test]
    fn passes_blob_through_and_counts() {
        let parameters: Parameters = [("prefix", ">> ")].into_iter().collect();
        let mut config = ModuleConfig::new("printer", "BlobPrinter", parameters, ServiceRegistry::new());
        let mut printer = BlobPrinter::default();
        printer.configure(&mut config).unwrap();

        let mut blob = Blob::new();
        blob.insert("a", 1_i32);
        assert_eq!(printer.render(&blob), ">> Blob (1 entries):\n 'a' => 1");
        assert_eq!(printer.render(&Blob::new()), ">> Empty blob");

        let passed = printer.process(blob).unwrap().into_blob().unwrap();
        assert_eq!(passed.get::<i32>("a").unwrap(), &1);
        let closing = printer.finish().unwrap();
        assert_eq!(closing.get::<usize>("printed").unwrap(), &1);
    }
}
