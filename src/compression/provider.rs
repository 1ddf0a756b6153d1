
//! The registry of available compression algorithms and the logic that
//! picks one for a CPU-time budget.

use smallvec::SmallVec;

use crate::compression::{deflate, Compressor, Decompressor};
use crate::error::{Error, Result};


/// Which wrapped library an algorithm entry drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodecFamily {
    Deflate,

    #[cfg(feature = "brotli")]
    Brotli,

    #[cfg(feature = "lzma")]
    Lzma,

    #[cfg(feature = "zstd")]
    Zstd,
}


/// An immutable descriptor of one registered compression algorithm
/// preset, able to produce fresh compressor and decompressor instances.
#[derive(Debug, Clone)]
pub struct CompressionAlgorithm {
    name: String,
    id: [u8; 8],
    family: CodecFamily,
    level: i32,
    compression_cycles_per_kilobyte: u64,
    average_compression_ratio: f32,
    experimental: bool,
}

impl CompressionAlgorithm {

    fn new(
        name: impl Into<String>, id: [u8; 8], family: CodecFamily, level: i32,
        compression_cycles_per_kilobyte: u64, average_compression_ratio: f32,
        experimental: bool,
    ) -> Self {
        CompressionAlgorithm {
            name: name.into(), id, family, level,
            compression_cycles_per_kilobyte, average_compression_ratio, experimental,
        }
    }

    /// Human-readable name including the wrapped library and preset.
    pub fn name(&self) -> &str { &self.name }

    /// The 8 byte id persisted alongside compressed data: four ascii
    /// bytes naming the algorithm plus a four digit format revision.
    /// All presets of a family share the id, since decompression does
    /// not depend on the preset.
    ///
    /// Ids must stay stable across releases while the produced format
    /// remains compatible; rev the digits when it does not.
    pub fn id(&self) -> [u8; 8] { self.id }

    /// Average CPU cycles this preset burns to compress one kilobyte,
    /// measured over a mixed corpus. Used for budget-based selection.
    pub fn compression_cycles_per_kilobyte(&self) -> u64 {
        self.compression_cycles_per_kilobyte
    }

    /// Average compressed-to-uncompressed size ratio over the same
    /// corpus; smaller is stronger.
    pub fn average_compression_ratio(&self) -> f32 {
        self.average_compression_ratio
    }

    /// Whether the implementation is not yet considered production
    /// proven. Fine for offline data that is verified after compression.
    pub fn is_experimental(&self) -> bool { self.experimental }

    /// Creates a fresh compressor for one stream.
    pub fn compressor(&self) -> Result<Box<dyn Compressor>> {
        match self.family {
            CodecFamily::Deflate =>
                Ok(Box::new(deflate::DeflateCompressor::new(self.level as u8))),

            #[cfg(feature = "brotli")]
            CodecFamily::Brotli =>
                Ok(Box::new(crate::compression::brotli::BrotliCompressor::new(self.level as u32))),

            #[cfg(feature = "lzma")]
            CodecFamily::Lzma =>
                Ok(Box::new(crate::compression::lzma::LzmaCompressor::new())),

            #[cfg(feature = "zstd")]
            CodecFamily::Zstd =>
                Ok(Box::new(crate::compression::zstd::ZstdCompressor::new(self.level)?)),
        }
    }

    /// Creates a fresh decompressor for one stream.
    pub fn decompressor(&self) -> Result<Box<dyn Decompressor>> {
        match self.family {
            CodecFamily::Deflate =>
                Ok(Box::new(deflate::DeflateDecompressor::new())),

            #[cfg(feature = "brotli")]
            CodecFamily::Brotli =>
                Ok(Box::new(crate::compression::brotli::BrotliDecompressor::new())),

            #[cfg(feature = "lzma")]
            CodecFamily::Lzma =>
                Ok(Box::new(crate::compression::lzma::LzmaDecompressor::new())),

            #[cfg(feature = "zstd")]
            CodecFamily::Zstd =>
                Ok(Box::new(crate::compression::zstd::ZstdDecompressor::new()?)),
        }
    }
}


/// Assumed CPU speed for translating time budgets into cycle budgets.
const ASSUMED_CPU_CYCLES_PER_SECOND: f64 = 2_000_000_000.0;

/// Enumerates the compression algorithms compiled into the crate and
/// selects among them by id or by performance requirement.
#[derive(Debug)]
pub struct CompressionProvider {
    algorithms: SmallVec<[CompressionAlgorithm; 12]>,
}

impl CompressionProvider {

    /// A provider over every compiled-in algorithm family, with a
    /// fastest, default and strongest preset registered for each.
    pub fn new() -> Self {
        let mut algorithms: SmallVec<[CompressionAlgorithm; 12]> = SmallVec::new();

        for (level, cycles, ratio) in [
            (deflate::FASTEST_LEVEL as i32, 90_000, 0.46),
            (deflate::DEFAULT_LEVEL as i32, 160_000, 0.42),
            (deflate::STRONGEST_LEVEL as i32, 420_000, 0.40),
        ] {
            algorithms.push(CompressionAlgorithm::new(
                format!("Deflate compression via miniz_oxide (level {})", level),
                *b"DFLT0001", CodecFamily::Deflate, level, cycles, ratio, false,
            ));
        }

        #[cfg(feature = "brotli")]
        {
            use crate::compression::brotli;

            for (quality, cycles, ratio) in [
                (brotli::FASTEST_QUALITY, 190_000, 0.41),
                (brotli::DEFAULT_QUALITY, 750_000, 0.36),
                (brotli::STRONGEST_QUALITY, 4_200_000, 0.33),
            ] {
                algorithms.push(CompressionAlgorithm::new(
                    format!("Brotli compression (quality {})", quality),
                    *b"BRTL0001", CodecFamily::Brotli, quality as i32, cycles, ratio, false,
                ));
            }
        }

        #[cfg(feature = "lzma")]
        {
            // the encoder has no level parameter; three entries keep the
            // family shaped like the others for selection purposes
            for cycles in [2_600_000_u64, 2_600_000, 2_600_000] {
                algorithms.push(CompressionAlgorithm::new(
                    "LZMA compression via lzma-rs",
                    *b"LZMA0001", CodecFamily::Lzma, 0, cycles, 0.34, true,
                ));
            }
        }

        #[cfg(feature = "zstd")]
        {
            use crate::compression::zstd;

            for (level, cycles, ratio) in [
                (zstd::FASTEST_LEVEL, 60_000, 0.44),
                (zstd::DEFAULT_LEVEL, 110_000, 0.40),
                (zstd::STRONGEST_LEVEL, 900_000, 0.35),
            ] {
                algorithms.push(CompressionAlgorithm::new(
                    format!("Zstandard compression (level {})", level),
                    *b"ZSTD0001", CodecFamily::Zstd, level, cycles, ratio, false,
                ));
            }
        }

        log::debug!("registered {} compression algorithm presets", algorithms.len());
        CompressionProvider { algorithms }
    }

    /// A provider over an explicit set of algorithms, mostly useful for
    /// testing selection policies.
    pub fn from_algorithms(algorithms: impl IntoIterator<Item = CompressionAlgorithm>) -> Self {
        CompressionProvider { algorithms: algorithms.into_iter().collect() }
    }

    /// Number of registered algorithm presets.
    pub fn count(&self) -> usize {
        self.algorithms.len()
    }

    /// The preset at the given registration index, for enumeration
    /// (benchmarking every registered algorithm, for example).
    pub fn get(&self, index: usize) -> Option<&CompressionAlgorithm> {
        self.algorithms.get(index)
    }

    /// The first registered preset of the family with the given id.
    /// Use this to obtain a decompressor for persisted data.
    pub fn by_id(&self, id: [u8; 8]) -> Result<&CompressionAlgorithm> {
        self.algorithms.iter()
            .find(|algorithm| algorithm.id == id)
            .ok_or(Error::UnknownAlgorithm(id))
    }

    /// The strongest algorithm expected to compress `uncompressed_size`
    /// bytes within the given time budget on an assumed 2 GHz core,
    /// falling back to the closest registered algorithm when none is
    /// fast enough.
    pub fn get_optimal(
        &self, uncompressed_size: usize, time_budget_seconds: f32
    ) -> Result<&CompressionAlgorithm> {
        if uncompressed_size == 0 {
            return Err(Error::invalid_argument("cannot budget for zero bytes of input"));
        }
        if self.algorithms.is_empty() {
            return Err(Error::invalid_argument("no compression algorithms registered"));
        }

        let kilobytes = uncompressed_size as f64 / 1024.0;
        let budget = ASSUMED_CPU_CYCLES_PER_SECOND * time_budget_seconds as f64 / kilobytes;

        let chosen = self.strongest_faster_than(budget as u64);
        log::trace!("budget of {:.0} cycles/KiB selects {}", budget, chosen.name());

        Ok(chosen)
    }

    /// The strongest algorithm whose cycle cost lies below
    /// `lowest + factor * (highest - lowest)` over the registered range.
    /// A factor of zero picks the fastest, a factor of one the strongest.
    pub fn get_strong(&self, performance_factor: f32) -> Result<&CompressionAlgorithm> {
        if self.algorithms.is_empty() {
            return Err(Error::invalid_argument("no compression algorithms registered"));
        }

        let cycle_counts = self.algorithms.iter()
            .map(CompressionAlgorithm::compression_cycles_per_kilobyte);

        let lowest = cycle_counts.clone().min().unwrap_or(0);
        let highest = cycle_counts.max().unwrap_or(0);

        let threshold = lowest + ((highest - lowest) as f64 * performance_factor as f64) as u64;
        Ok(self.strongest_faster_than(threshold))
    }

    /// The strongest (lowest ratio) algorithm strictly below the cycle
    /// threshold; if none qualifies, the algorithm closest to the
    /// threshold, which is then the fastest one registered.
    fn strongest_faster_than(&self, maximum_cycles_per_kilobyte: u64) -> &CompressionAlgorithm {
        debug_assert!(!self.algorithms.is_empty());

        let mut closest: &CompressionAlgorithm = &self.algorithms[0];
        let mut closest_distance = u64::MAX;

        let mut strongest: Option<&CompressionAlgorithm> = None;

        for algorithm in &self.algorithms {
            let cycles = algorithm.compression_cycles_per_kilobyte;

            let distance = if cycles > maximum_cycles_per_kilobyte {
                cycles - maximum_cycles_per_kilobyte
            } else {
                maximum_cycles_per_kilobyte - cycles
            };

            if distance < closest_distance {
                closest = algorithm;
                closest_distance = distance;
            }

            if cycles < maximum_cycles_per_kilobyte {
                let stronger = match strongest {
                    Some(best) => algorithm.average_compression_ratio < best.average_compression_ratio,
                    None => true,
                };
                if stronger {
                    strongest = Some(algorithm);
                }
            }
        }

        strongest.unwrap_or(closest)
    }
}

impl Default for CompressionProvider {
    fn default() -> Self { CompressionProvider::new() }
}


#[cfg(test)]
mod test {
    use super::*;

    /// The three-preset fixture the selection policies are specified
    /// against: speeds 1, 6, 9 with ratios 0.85, 0.80, 0.75.
    fn deflate_only_provider() -> CompressionProvider {
        CompressionProvider::from_algorithms([
            CompressionAlgorithm::new(
                "deflate fastest", *b"DFLT0001", CodecFamily::Deflate, 1, 100_000, 0.85, false
            ),
            CompressionAlgorithm::new(
                "deflate default", *b"DFLT0001", CodecFamily::Deflate, 6, 300_000, 0.80, false
            ),
            CompressionAlgorithm::new(
                "deflate strongest", *b"DFLT0001", CodecFamily::Deflate, 9, 900_000, 0.75, false
            ),
        ])
    }

    #[test]
    fn presets_are_registered_per_family(){
        let provider = CompressionProvider::new();

        assert!(provider.count() >= 3);
        assert_eq!(provider.count() % 3, 0, "three presets per family");

        for index in 0 .. provider.count() {
            let algorithm = provider.get(index).unwrap();
            assert!(!algorithm.name().is_empty());
            assert!(algorithm.compression_cycles_per_kilobyte() > 0);
            assert!(algorithm.average_compression_ratio() > 0.0);
            assert!(algorithm.average_compression_ratio() < 1.0);
        }

        assert!(provider.get(provider.count()).is_none());
    }

    #[test]
    fn ids_look_up_their_family(){
        let provider = CompressionProvider::new();

        let deflate = provider.by_id(*b"DFLT0001").unwrap();
        assert_eq!(deflate.id(), *b"DFLT0001");

        assert!(matches!(
            provider.by_id(*b"NONE0000"),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn algorithms_produce_working_instances(){
        let provider = CompressionProvider::new();

        for index in 0 .. provider.count() {
            let algorithm = provider.get(index).unwrap();

            let mut compressor = algorithm.compressor().unwrap();
            let mut decompressor = algorithm.decompressor().unwrap();

            let payload = b"roundtrip through every registered preset";
            let mut compressed = Vec::new();
            let mut restored = Vec::new();

            use crate::compression::StopReason;

            let mut scratch = [0_u8; 512];
            let mut offset = 0;
            while offset < payload.len() {
                let status = compressor.process(&payload[offset ..], &mut scratch).unwrap();
                offset += status.bytes_consumed;
                compressed.extend_from_slice(&scratch[.. status.bytes_written]);
            }
            loop {
                let status = compressor.finish(&mut scratch).unwrap();
                compressed.extend_from_slice(&scratch[.. status.bytes_written]);
                if status.reason == StopReason::Finished { break; }
            }

            let mut offset = 0;
            while offset < compressed.len() {
                let status = decompressor.process(&compressed[offset ..], &mut scratch).unwrap();
                offset += status.bytes_consumed;
                restored.extend_from_slice(&scratch[.. status.bytes_written]);
            }
            loop {
                let status = decompressor.finish(&mut scratch).unwrap();
                restored.extend_from_slice(&scratch[.. status.bytes_written]);
                if status.reason == StopReason::Finished { break; }
            }

            assert_eq!(restored, payload, "{} failed its round trip", algorithm.name());
        }
    }

    #[test]
    fn strong_selection_picks_the_lower_half(){
        let provider = deflate_only_provider();

        // threshold lands at 500k cycles; the default preset is the
        // strongest below it
        let chosen = provider.get_strong(0.5).unwrap();
        assert_eq!(chosen.name(), "deflate default");

        assert_eq!(provider.get_strong(0.0).unwrap().name(), "deflate fastest");
        assert_eq!(provider.get_strong(1.0).unwrap().name(), "deflate default");
    }

    #[test]
    fn equal_speeds_tie_break_toward_the_stronger_ratio(){
        let provider = CompressionProvider::from_algorithms([
            CompressionAlgorithm::new(
                "weak", *b"DFLT0001", CodecFamily::Deflate, 1, 100_000, 0.85, false
            ),
            CompressionAlgorithm::new(
                "strong", *b"DFLT0001", CodecFamily::Deflate, 9, 100_000, 0.70, false
            ),
            CompressionAlgorithm::new(
                "slowpoke", *b"DFLT0001", CodecFamily::Deflate, 9, 900_000, 0.60, false
            ),
        ]);

        let chosen = provider.get_strong(0.5).unwrap();
        assert_eq!(chosen.name(), "strong");
    }

    #[test]
    fn budgets_translate_into_cycle_limits(){
        let provider = deflate_only_provider();

        // 1 MiB in 1 second on 2 GHz leaves ~1.95M cycles/KiB, enough
        // for the strongest preset
        let generous = provider.get_optimal(1024 * 1024, 1.0).unwrap();
        assert_eq!(generous.name(), "deflate strongest");

        // 100 MiB in 20 milliseconds affords no registered preset,
        // so the fastest is the fallback
        let desperate = provider.get_optimal(100 * 1024 * 1024, 0.02).unwrap();
        assert_eq!(desperate.name(), "deflate fastest");
    }

    #[test]
    fn zero_sized_budgets_are_rejected(){
        let provider = deflate_only_provider();

        assert!(matches!(
            provider.get_optimal(0, 1.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn experimental_flags_survive_registration(){
        let provider = CompressionProvider::new();

        #[cfg(feature = "lzma")]
        assert!(provider.by_id(*b"LZMA0001").unwrap().is_experimental());

        assert!(!provider.by_id(*b"DFLT0001").unwrap().is_experimental());
    }
}
