mod arithmetic;
mod constants;
mod dot;
mod lut;
mod programs;
